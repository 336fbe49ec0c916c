//! Final shipping-option selection.
//!
//! [`select_options`] runs once per rating pass, after every method registered its candidates.
//! Rules are evaluated in order and the first match wins:
//!
//! 1. an active free-shipping coupon yields the single free option;
//! 2. a cart made only of free-class items yields the single free option;
//! 3. a foreign destination keeps only international-ground options;
//! 4. a ground-class item keeps only domestic ground options, otherwise a postal-class item keeps
//!    only postal options, otherwise everything is kept.
//!
//! Whenever rule 3 or 4 would leave nothing to offer, the unfiltered candidates are returned so
//! checkout never dead-ends.

// self
use crate::{
	_prelude::*,
	method::MethodKind,
	obs::{DebugFact, Traced},
	package::LineItem,
	quote::ShippingOption,
	settings::{ShippingClasses, ShippingSettings},
};

/// Coupon applied to the cart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
	/// Coupon code.
	pub code: String,
	/// Whether the coupon grants free shipping.
	pub free_shipping: bool,
}
impl Coupon {
	/// Creates a coupon.
	pub fn new(code: impl Into<String>, free_shipping: bool) -> Self {
		Self { code: code.into(), free_shipping }
	}
}

/// Cart facts the filter decides on. Built fresh for every rating pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterContext {
	/// Some item carries the ground-carrier class.
	pub has_ground_class_item: bool,
	/// Some item carries the postal-carrier class.
	pub has_postal_class_item: bool,
	/// Some item carries the free-shipping class.
	pub has_free_class_item: bool,
	/// Some item is outside the free-shipping class.
	pub has_chargeable_item: bool,
	/// A free-shipping coupon is applied.
	pub has_free_shipping_coupon: bool,
	/// Destination country code.
	pub destination_country: String,
}
impl FilterContext {
	/// Scans the cart, recording the classes detected per item.
	pub fn from_cart<I>(
		items: &[I],
		destination_country: impl Into<String>,
		classes: &ShippingClasses,
		coupons: &[Coupon],
	) -> Traced<Self>
	where
		I: LineItem,
	{
		let mut ctx = Self {
			destination_country: destination_country.into(),
			has_free_shipping_coupon: coupons.iter().any(|coupon| coupon.free_shipping),
			..Default::default()
		};
		let mut facts = Vec::with_capacity(items.len());

		for item in items {
			let class = item.shipping_class();
			let ground = classes.is_ground(class);
			let postal = classes.is_postal(class);
			let free = classes.is_free(class);

			ctx.has_ground_class_item |= ground;
			ctx.has_postal_class_item |= postal;
			ctx.has_free_class_item |= free;
			ctx.has_chargeable_item |= !free;

			facts.push(
				DebugFact::new("item_class", item.name())
					.with("class", class.unwrap_or("-"))
					.with("ground", ground)
					.with("postal", postal)
					.with("free", free),
			);
		}

		Traced::new(ctx, facts)
	}

	/// Returns `true` when every item is in the free-shipping class.
	pub fn is_all_free(&self) -> bool {
		self.has_free_class_item && !self.has_chargeable_item
	}
}

/// Which rule decided the outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterRule {
	/// Free-shipping coupon override.
	Coupon,
	/// All-items-free override.
	AllFree,
	/// Foreign destination.
	International,
	/// Ground-class item present.
	GroundClass,
	/// Postal-class item present.
	PostalClass,
	/// No rule restricted the candidates.
	Unfiltered,
}
impl FilterRule {
	/// Returns a stable label suitable for debug facts.
	pub const fn as_str(self) -> &'static str {
		match self {
			FilterRule::Coupon => "coupon",
			FilterRule::AllFree => "all_free",
			FilterRule::International => "international",
			FilterRule::GroundClass => "ground_class",
			FilterRule::PostalClass => "postal_class",
			FilterRule::Unfiltered => "unfiltered",
		}
	}

	fn keeps(self) -> Option<MethodKind> {
		match self {
			FilterRule::International => Some(MethodKind::GroundInternational),
			FilterRule::GroundClass => Some(MethodKind::Ground),
			FilterRule::PostalClass => Some(MethodKind::Postal),
			_ => None,
		}
	}
}
impl Display for FilterRule {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Picks the rule that applies to `ctx`.
pub fn decide(ctx: &FilterContext, settings: &ShippingSettings) -> FilterRule {
	if ctx.has_free_shipping_coupon {
		FilterRule::Coupon
	} else if ctx.is_all_free() {
		FilterRule::AllFree
	} else if !settings.is_domestic(&ctx.destination_country) {
		FilterRule::International
	} else if ctx.has_ground_class_item {
		FilterRule::GroundClass
	} else if ctx.has_postal_class_item {
		FilterRule::PostalClass
	} else {
		FilterRule::Unfiltered
	}
}

/// Decides the options offered to the shopper. Pure and infallible.
pub fn select_options(
	candidates: Vec<ShippingOption>,
	ctx: &FilterContext,
	settings: &ShippingSettings,
) -> Traced<Vec<ShippingOption>> {
	let rule = decide(ctx, settings);
	let mut facts = vec![
		DebugFact::new("filter_rule", rule)
			.with("country", &ctx.destination_country)
			.with("ground_class", ctx.has_ground_class_item)
			.with("postal_class", ctx.has_postal_class_item)
			.with("candidates", candidates.len()),
	];
	let selected = match (rule, rule.keeps()) {
		(FilterRule::Coupon | FilterRule::AllFree, _) => vec![ShippingOption::free_shipping()],
		(_, None) => candidates,
		(rule, Some(kind)) => {
			let kept =
				candidates.iter().filter(|option| kind.owns(option)).cloned().collect::<Vec<_>>();

			if kept.is_empty() {
				facts.push(DebugFact::new("filter_fallback", rule).with("kept", 0));

				candidates
			} else {
				kept
			}
		},
	};

	facts.push(DebugFact::new(
		"filter_selected",
		selected.iter().map(|option| option.id.as_str()).collect::<Vec<_>>().join(","),
	));

	Traced::new(selected, facts)
}
