//! Host-facing shipping methods.
//!
//! A [`ShippingMethod`] is the glue the host cart engine invokes once per method per rating
//! pass: cart → [`Package`](crate::package::Package) → carrier quote → registered
//! [`ShippingOption`]s. The three methods differ only in their [`MethodKind`].

// self
use crate::{
	_prelude::*,
	carrier::Service,
	http::CarrierHttpClient,
	oauth::TransportErrorMapper,
	obs::DebugFact,
	package::{CartPackage, PackageAggregator},
	quote::ShippingOption,
	rating::CarrierClient,
};

/// Shipping methods exposed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
	/// Domestic ground.
	Ground,
	/// International standard via the ground carrier.
	GroundInternational,
	/// Postal ground advantage.
	Postal,
}
impl MethodKind {
	/// Method id; registered options are prefixed with `"<id>:"`.
	pub const fn id(self) -> &'static str {
		match self {
			MethodKind::Ground => "ground",
			MethodKind::GroundInternational => "ground_international",
			MethodKind::Postal => "postal",
		}
	}

	/// Carrier service the method quotes.
	pub const fn service(self) -> Service {
		match self {
			MethodKind::Ground => Service::GroundDomestic,
			MethodKind::GroundInternational => Service::GroundInternational,
			MethodKind::Postal => Service::PostalGroundAdvantage,
		}
	}

	/// Returns `true` when the method quotes destinations of this scope.
	pub const fn serves(self, domestic: bool) -> bool {
		matches!(self, MethodKind::GroundInternational) != domestic
	}

	/// Returns `true` when `option` was registered by this method.
	pub fn owns(self, option: &ShippingOption) -> bool {
		option.method_id() == self.id()
	}
}
impl Display for MethodKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.id())
	}
}

/// Host seam that receives candidate rates.
pub trait RateRegistry
where
	Self: Send,
{
	/// Registers one candidate option.
	fn register(&mut self, option: ShippingOption);
}

/// In-crate [`RateRegistry`] collecting candidates in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateRates(Vec<ShippingOption>);
impl CandidateRates {
	/// Registered options.
	pub fn as_slice(&self) -> &[ShippingOption] {
		&self.0
	}

	/// Number of registered options.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when nothing was registered.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Consumes the registry.
	pub fn into_inner(self) -> Vec<ShippingOption> {
		self.0
	}
}
impl RateRegistry for CandidateRates {
	fn register(&mut self, option: ShippingOption) {
		self.0.push(option);
	}
}
impl Extend<ShippingOption> for CandidateRates {
	fn extend<T>(&mut self, iter: T)
	where
		T: IntoIterator<Item = ShippingOption>,
	{
		self.0.extend(iter);
	}
}

/// One host shipping method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShippingMethod {
	kind: MethodKind,
}
impl ShippingMethod {
	/// Creates the adapter for `kind`.
	pub const fn new(kind: MethodKind) -> Self {
		Self { kind }
	}

	/// Method this adapter represents.
	pub const fn kind(&self) -> MethodKind {
		self.kind
	}

	/// Quotes `cart` and registers the results; returns how many options were registered.
	///
	/// A cart made only of free-class items registers nothing, leaving the free option to the
	/// rate filter.
	pub async fn calculate_shipping<C, M>(
		&self,
		cart: &CartPackage,
		client: &CarrierClient<C, M>,
		registry: &mut dyn RateRegistry,
	) -> usize
	where
		C: ?Sized + CarrierHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let classes = client.settings().classes();
		let debug = client.debug_log();
		let package = PackageAggregator::new(classes.clone())
			.aggregate(cart.destination.clone(), &cart.items)
			.emit(debug, "package");
		let all_free = !cart.items.is_empty()
			&& cart.items.iter().all(|item| classes.is_free(item.shipping_class.as_deref()));

		if !package.is_rateable() && all_free {
			debug.record(
				"method",
				DebugFact::new("free_class_cart", self.kind).with("items", cart.items.len()),
			);

			return 0;
		}

		let quotes = client.fetch_rates(&package, self.kind.service()).await;
		let mut registered = 0;

		for quote in quotes.values() {
			let option = ShippingOption::from_quote(self.kind.id(), quote);

			debug.record(
				"method",
				DebugFact::new("rate_registered", &option.id).with("cost", option.cost),
			);
			registry.register(option);

			registered += 1;
		}

		registered
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::quote::RateQuote;

	#[test]
	fn kinds_pair_ids_with_services() {
		assert_eq!(MethodKind::Ground.service(), Service::GroundDomestic);
		assert_eq!(MethodKind::GroundInternational.service().code(), "11");
		assert_eq!(MethodKind::Postal.id(), "postal");
	}

	#[test]
	fn kinds_serve_one_destination_scope() {
		assert!(MethodKind::Ground.serves(true));
		assert!(MethodKind::Postal.serves(true));
		assert!(!MethodKind::GroundInternational.serves(true));
		assert!(MethodKind::GroundInternational.serves(false));
		assert!(!MethodKind::Ground.serves(false));
		assert!(!MethodKind::Postal.serves(false));
	}

	#[test]
	fn ownership_respects_the_id_boundary() {
		let quote = RateQuote::new(Service::GroundInternational, Decimal::new(2500, 2), 0.0);
		let option = ShippingOption::from_quote(MethodKind::GroundInternational.id(), &quote);

		assert!(MethodKind::GroundInternational.owns(&option));
		assert!(!MethodKind::Ground.owns(&option));
	}

	#[test]
	fn candidate_rates_keep_registration_order() {
		let mut rates = CandidateRates::default();

		rates.register(ShippingOption::free_shipping());
		rates.register(ShippingOption::from_quote(
			"postal",
			&RateQuote::new(Service::PostalGroundAdvantage, Decimal::new(850, 2), 0.0),
		));

		assert_eq!(rates.len(), 2);
		assert_eq!(rates.as_slice()[1].id, "postal:usps-ground-advantage");
	}
}
