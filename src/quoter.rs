//! Rating-pass orchestration plus the admin probe and reset actions.

// self
use crate::{
	_prelude::*,
	carrier::{Carrier, Service},
	filter::{self, Coupon, FilterContext},
	http::CarrierHttpClient,
	method::{CandidateRates, MethodKind, ShippingMethod},
	oauth::TransportErrorMapper,
	obs::{DebugFact, QuoteSpan},
	package::{Address, CartPackage, Dimensions, Package},
	quote::{RateQuotes, ShippingOption},
	rating::CarrierClient,
};

/// Runs every shipping method for a cart and filters the result.
pub struct RateQuoter<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<CarrierClient<C, M>>,
}
impl<C, M> RateQuoter<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps a shared carrier client.
	pub fn new(client: Arc<CarrierClient<C, M>>) -> Self {
		Self { client }
	}

	/// Carrier client used for every quote.
	pub fn client(&self) -> &CarrierClient<C, M> {
		&self.client
	}

	/// Runs the shipping methods that serve the cart's destination concurrently and collects
	/// their candidates in method order.
	///
	/// Domestic carts skip international ground; foreign carts skip domestic ground and postal.
	pub async fn candidates(&self, cart: &CartPackage) -> CandidateRates {
		let domestic = self.client.settings().is_domestic(&cart.destination.country_code);
		let (mut rates, international, postal) = tokio::join!(
			self.method_candidates(MethodKind::Ground, cart, domestic),
			self.method_candidates(MethodKind::GroundInternational, cart, domestic),
			self.method_candidates(MethodKind::Postal, cart, domestic),
		);

		rates.extend(international.into_inner());
		rates.extend(postal.into_inner());

		rates
	}

	/// Options offered to the shopper for `cart`.
	pub async fn quote(&self, cart: &CartPackage, coupons: &[Coupon]) -> Vec<ShippingOption> {
		let span = QuoteSpan::new("quote", None);

		span.instrument(async move {
			let settings = self.client.settings();
			let debug = self.client.debug_log();
			let candidates = self.candidates(cart).await;
			let ctx = FilterContext::from_cart(
				&cart.items,
				cart.destination.country_code.clone(),
				&settings.classes(),
				coupons,
			)
			.emit(debug, "filter");

			filter::select_options(candidates.into_inner(), &ctx, settings).emit(debug, "filter")
		})
		.await
	}

	/// Quotes a hand-entered package, bypassing the cart.
	///
	/// Foreign destinations are quoted for international ground only; domestic ones for ground
	/// and postal.
	pub async fn probe(&self, request: &ProbeRequest) -> Result<ProbeReport> {
		request.validate()?;

		let package = request.package();
		let international = !self.client.settings().is_domestic(&request.destination.country_code);
		let results = if international {
			vec![self.probe_service(&package, Service::GroundInternational).await]
		} else {
			let (ground, postal) = tokio::join!(
				self.probe_service(&package, Service::GroundDomestic),
				self.probe_service(&package, Service::PostalGroundAdvantage),
			);

			vec![ground, postal]
		};

		Ok(ProbeReport { international, results })
	}

	/// Drops cached tokens for both carriers and clears every notice.
	pub async fn reset(&self) -> Result<()> {
		self.client.tokens().invalidate_all().await?;
		self.client.notices().clear_all();

		Ok(())
	}

	async fn method_candidates(
		&self,
		kind: MethodKind,
		cart: &CartPackage,
		domestic: bool,
	) -> CandidateRates {
		let mut rates = CandidateRates::default();

		if kind.serves(domestic) {
			let client = self.client.as_ref();

			ShippingMethod::new(kind).calculate_shipping(cart, client, &mut rates).await;
		} else {
			let fact = DebugFact::new("method_skipped", kind).with("domestic", domestic);

			self.client.debug_log().record("method", fact);
		}

		rates
	}

	async fn probe_service(&self, package: &Package, service: Service) -> ProbeResult {
		let quotes = self.client.fetch_rates(package, service).await;
		let notice = if quotes.is_empty() {
			self.client.notices().get(service.carrier())
		} else {
			None
		};

		ProbeResult { service, quotes, notice }
	}
}
impl<C, M> Clone for RateQuoter<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { client: self.client.clone() }
	}
}
impl<C, M> Debug for RateQuoter<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateQuoter").field("client", &self.client).finish()
	}
}

/// Hand-entered package for the admin rate probe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
	/// Destination address.
	pub destination: Address,
	/// Weight in pounds.
	pub weight: f64,
	/// Package dimensions in inches.
	pub dimensions: Dimensions,
}
impl ProbeRequest {
	/// Checks that the address is complete and every measure is positive.
	pub fn validate(&self) -> Result<()> {
		let address = [
			("city", &self.destination.city),
			("state", &self.destination.state),
			("postal code", &self.destination.postal_code),
			("country", &self.destination.country_code),
		];

		for (field, value) in address {
			if value.trim().is_empty() {
				return Err(Error::InvalidProbe { reason: format!("{field} is required") });
			}
		}

		let measures = [
			("weight", self.weight),
			("length", self.dimensions.length),
			("width", self.dimensions.width),
			("height", self.dimensions.height),
		];

		for (field, value) in measures {
			if !(value.is_finite() && value > 0.0) {
				return Err(Error::InvalidProbe {
					reason: format!("{field} must be a positive number"),
				});
			}
		}

		Ok(())
	}

	fn package(&self) -> Package {
		Package {
			weight: self.weight,
			dimensions: self.dimensions,
			destination: self.destination.clone(),
			items: Vec::new(),
		}
	}
}

/// Outcome of a rate probe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
	/// Whether the destination was treated as international.
	pub international: bool,
	/// One entry per quoted service.
	pub results: Vec<ProbeResult>,
}
impl ProbeReport {
	/// Result for `carrier`, if it was quoted.
	pub fn for_carrier(&self, carrier: Carrier) -> Option<&ProbeResult> {
		self.results.iter().find(|result| result.service.carrier() == carrier)
	}
}

/// Quotes for one service, plus the carrier's notice when nothing came back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
	/// Service that was quoted.
	pub service: Service,
	/// Quotes keyed by label.
	pub quotes: RateQuotes,
	/// Carrier's last failure notice when `quotes` is empty.
	pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> ProbeRequest {
		ProbeRequest {
			destination: Address {
				city: "Austin".into(),
				state: "TX".into(),
				postal_code: "78701".into(),
				country_code: "US".into(),
			},
			weight: 2.0,
			dimensions: Dimensions::new(10.0, 8.0, 4.0),
		}
	}

	#[test]
	fn probe_requests_require_every_field() {
		request().validate().expect("A complete probe should validate.");

		let mut missing_city = request();

		missing_city.destination.city = " ".into();

		assert!(matches!(
			missing_city.validate(),
			Err(Error::InvalidProbe { ref reason }) if reason == "city is required"
		));

		let mut flat = request();

		flat.dimensions.height = 0.0;

		assert!(matches!(
			flat.validate(),
			Err(Error::InvalidProbe { ref reason }) if reason.starts_with("height")
		));
	}
}
