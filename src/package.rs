//! Cart → single rateable package reduction.
//!
//! Line items are consumed through the narrow [`LineItem`] capability so any host product
//! model can be rated. Sizing follows a "worst case single carton" policy: each dimension is
//! the largest per-item value scaled by that item's quantity, never a bin-packed sum.

// self
use crate::{
	_prelude::*,
	obs::{DebugFact, Traced},
	settings::ShippingClasses,
};

/// Dimension used when no item contributes a positive value, in inches.
pub const FALLBACK_DIMENSION_IN: f64 = 1.0;

/// Destination or origin address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	/// City name.
	pub city: String,
	/// State or province code.
	pub state: String,
	/// Postal or ZIP code.
	pub postal_code: String,
	/// ISO country code.
	pub country_code: String,
}

/// Length, width, and height in inches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
	/// Length in inches.
	pub length: f64,
	/// Width in inches.
	pub width: f64,
	/// Height in inches.
	pub height: f64,
}
impl Dimensions {
	/// Creates a dimension triple.
	pub const fn new(length: f64, width: f64, height: f64) -> Self {
		Self { length, width, height }
	}
}

/// Capability a cart line must expose to be rated.
pub trait LineItem {
	/// Human-readable name used in debug facts.
	fn name(&self) -> &str;

	/// Product identity; defaults to the name.
	fn product_id(&self) -> &str {
		self.name()
	}

	/// Unit weight in pounds, if known.
	fn weight(&self) -> Option<f64>;

	/// Unit dimensions in inches; unknown sides are zero.
	fn dimensions(&self) -> Dimensions;

	/// Shipping-class slug, if the product carries one.
	fn shipping_class(&self) -> Option<&str>;

	/// Ordered quantity.
	fn quantity(&self) -> u32;
}

/// Plain line item used by hosts that do not bring their own product model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
	/// Product identity.
	pub product_id: String,
	/// Product name.
	pub name: String,
	/// Shipping-class slug.
	pub shipping_class: Option<String>,
	/// Unit weight in pounds.
	pub weight: Option<f64>,
	/// Unit length in inches.
	pub length: f64,
	/// Unit width in inches.
	pub width: f64,
	/// Unit height in inches.
	pub height: f64,
	/// Ordered quantity.
	pub quantity: u32,
}
impl CartItem {
	/// Creates an item with the given identity, unit weight, and quantity.
	pub fn new(product_id: impl Into<String>, weight: f64, quantity: u32) -> Self {
		let product_id = product_id.into();

		Self {
			name: product_id.clone(),
			product_id,
			weight: Some(weight),
			quantity,
			..Default::default()
		}
	}

	/// Snapshots any [`LineItem`] into a plain cart item.
	pub fn from_line_item<I>(item: &I) -> Self
	where
		I: ?Sized + LineItem,
	{
		let sides = item.dimensions();

		Self {
			product_id: item.product_id().to_owned(),
			name: item.name().to_owned(),
			shipping_class: item.shipping_class().map(str::to_owned),
			weight: item.weight(),
			length: sides.length,
			width: sides.width,
			height: sides.height,
			quantity: item.quantity(),
		}
	}

	/// Sets the unit dimensions.
	pub fn with_dimensions(mut self, length: f64, width: f64, height: f64) -> Self {
		self.length = length;
		self.width = width;
		self.height = height;

		self
	}

	/// Sets the shipping-class slug.
	pub fn with_shipping_class(mut self, class: impl Into<String>) -> Self {
		self.shipping_class = Some(class.into());

		self
	}

	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}
}
impl LineItem for CartItem {
	fn name(&self) -> &str {
		&self.name
	}

	fn product_id(&self) -> &str {
		&self.product_id
	}

	fn weight(&self) -> Option<f64> {
		self.weight
	}

	fn dimensions(&self) -> Dimensions {
		Dimensions::new(self.length, self.width, self.height)
	}

	fn shipping_class(&self) -> Option<&str> {
		self.shipping_class.as_deref()
	}

	fn quantity(&self) -> u32 {
		self.quantity
	}
}

/// Cart contents and destination as handed over by the host for one shipping package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartPackage {
	/// Destination address.
	pub destination: Address,
	/// Line items, in cart order.
	pub items: Vec<CartItem>,
}

/// Rateable package derived from a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
	/// Chargeable weight in pounds; `<= 0` means nothing to rate.
	pub weight: f64,
	/// Worst-case single-carton dimensions.
	pub dimensions: Dimensions,
	/// Destination address.
	pub destination: Address,
	/// Items the package was built from.
	pub items: Vec<CartItem>,
}
impl Package {
	/// Returns `true` when the package carries chargeable weight.
	pub fn is_rateable(&self) -> bool {
		self.weight > 0.0
	}
}

/// Reduces cart lines into a [`Package`].
#[derive(Clone, Debug, Default)]
pub struct PackageAggregator {
	classes: ShippingClasses,
}
impl PackageAggregator {
	/// Creates an aggregator that skips items in the configured free-shipping class.
	pub fn new(classes: ShippingClasses) -> Self {
		Self { classes }
	}

	/// Aggregates items into a package bound for `destination`.
	pub fn aggregate<I>(&self, destination: Address, items: &[I]) -> Traced<Package>
	where
		I: LineItem,
	{
		let mut facts = Vec::with_capacity(items.len() + 1);
		let mut weight = 0.0;
		let mut dimensions = Dimensions::default();

		for item in items {
			let quantity = item.quantity().max(1);

			if self.classes.is_free(item.shipping_class()) {
				facts.push(
					DebugFact::new("package_item_skipped", item.name())
						.with("reason", "free shipping class"),
				);

				continue;
			}

			let unit =
				item.weight().filter(|value| value.is_finite() && *value > 0.0).unwrap_or(0.0);

			weight += unit * f64::from(quantity);

			let sides = item.dimensions();

			dimensions.length = dimensions.length.max(scaled(sides.length, quantity));
			dimensions.width = dimensions.width.max(scaled(sides.width, quantity));
			dimensions.height = dimensions.height.max(scaled(sides.height, quantity));

			facts.push(
				DebugFact::new("package_item", item.name())
					.with("weight", unit)
					.with("quantity", quantity)
					.with("running_weight", weight),
			);
		}

		for side in [&mut dimensions.length, &mut dimensions.width, &mut dimensions.height] {
			if *side <= 0.0 {
				*side = FALLBACK_DIMENSION_IN;
			}
		}

		facts.push(
			DebugFact::new("cart_package_weight", weight)
				.with("length", dimensions.length)
				.with("width", dimensions.width)
				.with("height", dimensions.height),
		);

		let items = items.iter().map(CartItem::from_line_item).collect();

		Traced::new(Package { weight, dimensions, destination, items }, facts)
	}
}

fn scaled(side: f64, quantity: u32) -> f64 {
	if side.is_finite() && side > 0.0 { side * f64::from(quantity) } else { 0.0 }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn aggregator(free: Option<&str>) -> PackageAggregator {
		PackageAggregator::new(ShippingClasses {
			free: free.map(str::to_owned),
			..Default::default()
		})
	}

	#[test]
	fn free_class_items_are_excluded_from_weight() {
		let items = [
			CartItem::new("mug", 2.0, 3),
			CartItem::new("sticker", 1.0, 1).with_shipping_class("free-ship"),
		];
		let package = aggregator(Some("free-ship")).aggregate(Address::default(), &items).value;

		assert_eq!(package.weight, 6.0);
		assert_eq!(package.items.len(), 2);
	}

	#[test]
	fn dimensions_take_the_largest_scaled_item() {
		let items = [
			CartItem::new("a", 1.0, 2).with_dimensions(10.0, 4.0, 3.0),
			CartItem::new("b", 1.0, 1).with_dimensions(12.0, 9.0, 0.0),
		];
		let package = aggregator(None).aggregate(Address::default(), &items).value;

		assert_eq!(package.dimensions, Dimensions::new(20.0, 9.0, 6.0));
	}

	#[test]
	fn missing_dimensions_and_weights_fall_back() {
		let mut item = CartItem::new("ghost", 0.0, 0);

		item.weight = None;

		let traced = aggregator(None).aggregate(Address::default(), &[item]);

		assert_eq!(traced.value.weight, 0.0);
		assert!(!traced.value.is_rateable());
		assert_eq!(traced.value.dimensions, Dimensions::new(1.0, 1.0, 1.0));
	}

	#[test]
	fn emits_one_fact_per_item_plus_totals() {
		let items = [CartItem::new("a", 1.5, 2), CartItem::new("b", 0.5, 1)];
		let traced = aggregator(None).aggregate(Address::default(), &items);

		assert_eq!(traced.facts.len(), 3);
		assert_eq!(traced.facts[1].field("running_weight"), Some("3.5"));
		assert_eq!(traced.facts[2].key, "cart_package_weight");
	}
}
