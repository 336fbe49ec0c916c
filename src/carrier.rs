//! Carrier-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated endpoint metadata (`CarrierDescriptor`) for the token and
//! rating endpoints plus the token-request style each carrier expects. `strategy` defines
//! [`CarrierStrategy`], the hook the rating client uses to shape payloads and read responses,
//! with one implementation per carrier in `ground` and `postal`.

pub mod descriptor;
pub mod ground;
pub mod postal;
pub mod strategy;

pub use descriptor::*;
pub use ground::GroundStrategy;
pub use postal::PostalStrategy;
pub use strategy::*;

// self
use crate::_prelude::*;

/// Carriers the crate can rate against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Carrier {
	/// Domestic parcel carrier offering ground and international tiers.
	Ground,
	/// National postal service offering the ground-advantage tier.
	Postal,
}
impl Carrier {
	/// Both carriers, in a stable order.
	pub const ALL: [Carrier; 2] = [Carrier::Ground, Carrier::Postal];

	/// Returns a stable label suitable for span, metric, or notice fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Carrier::Ground => "ground",
			Carrier::Postal => "postal",
		}
	}

	/// Strategy that shapes this carrier's requests and reads its responses.
	pub fn strategy(self) -> &'static dyn CarrierStrategy {
		match self {
			Carrier::Ground => &GroundStrategy,
			Carrier::Postal => &PostalStrategy,
		}
	}
}
impl Display for Carrier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Product tiers a rate request can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
	/// Ground carrier, domestic ground.
	GroundDomestic,
	/// Ground carrier, international standard.
	GroundInternational,
	/// Postal carrier, ground advantage.
	PostalGroundAdvantage,
}
impl Service {
	/// Carrier that sells this service.
	pub const fn carrier(self) -> Carrier {
		match self {
			Service::GroundDomestic | Service::GroundInternational => Carrier::Ground,
			Service::PostalGroundAdvantage => Carrier::Postal,
		}
	}

	/// Wire code identifying the service to the carrier.
	pub const fn code(self) -> &'static str {
		match self {
			Service::GroundDomestic => "03",
			Service::GroundInternational => "11",
			Service::PostalGroundAdvantage => "USPS_GROUND_ADVANTAGE",
		}
	}

	/// Shopper-facing service label.
	pub const fn label(self) -> &'static str {
		match self {
			Service::GroundDomestic => "UPS Ground",
			Service::GroundInternational => "UPS Standard",
			Service::PostalGroundAdvantage => "USPS Ground Advantage",
		}
	}
}
impl Display for Service {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn services_map_to_their_carrier() {
		assert_eq!(Service::GroundDomestic.carrier(), Carrier::Ground);
		assert_eq!(Service::GroundInternational.carrier(), Carrier::Ground);
		assert_eq!(Service::PostalGroundAdvantage.carrier(), Carrier::Postal);
		assert_eq!(Service::GroundInternational.code(), "11");
	}

	#[test]
	fn carrier_serializes_as_snake_case() {
		let payload =
			serde_json::to_string(&Carrier::Postal).expect("Carrier should serialize to JSON.");

		assert_eq!(payload, "\"postal\"");
	}
}
