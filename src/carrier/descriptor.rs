//! Carrier descriptor data structures shared by the token cache and the rating client.
//!
//! Descriptors carry the endpoints and token-request style of a carrier so the rest of the
//! crate never hard-codes a URL; tests swap them for mock-server descriptors.

/// Builder API for assembling carrier descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, carrier::Carrier};

const GROUND_TOKEN_URL: &str = "https://onlinetools.ups.com/security/v1/oauth/token";
const GROUND_RATING_URL: &str = "https://onlinetools.ups.com/api/rating/v1/Rate";
const POSTAL_TOKEN_URL: &str = "https://apis.usps.com/oauth2/v3/token";
const POSTAL_RATING_URL: &str = "https://apis.usps.com/prices/v3/base-rates/search";

/// How a carrier expects client credentials on its token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenAuthStyle {
	#[default]
	/// HTTP Basic `client_id:client_secret` with a form-encoded grant.
	BasicForm,
	/// JSON body carrying `client_id`, `client_secret`, and `grant_type`.
	JsonBody,
}

/// Endpoint set declared by a carrier descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierEndpoints {
	/// OAuth 2.0 token endpoint.
	pub token: Url,
	/// Rating endpoint that prices a package.
	pub rating: Url,
}

/// Immutable carrier descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDescriptor {
	/// Carrier described by this descriptor.
	pub carrier: Carrier,
	/// Endpoint definitions exposed by the carrier.
	pub endpoints: CarrierEndpoints,
	/// Token-request style.
	pub token_auth: TokenAuthStyle,
}
impl CarrierDescriptor {
	/// Creates a new builder for the provided carrier.
	pub fn builder(carrier: Carrier) -> CarrierDescriptorBuilder {
		CarrierDescriptorBuilder::new(carrier)
	}

	/// Production descriptor for the carrier.
	pub fn production(carrier: Carrier) -> Result<Self, CarrierDescriptorError> {
		let (token, rating, style) = match carrier {
			Carrier::Ground => (GROUND_TOKEN_URL, GROUND_RATING_URL, TokenAuthStyle::BasicForm),
			Carrier::Postal => (POSTAL_TOKEN_URL, POSTAL_RATING_URL, TokenAuthStyle::JsonBody),
		};

		Self::builder(carrier)
			.token_endpoint(parse_endpoint("token", token)?)
			.rating_endpoint(parse_endpoint("rating", rating)?)
			.token_auth(style)
			.build()
	}
}

/// Descriptor pair consumed by the token cache and the rating client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDescriptors {
	/// Ground carrier descriptor.
	pub ground: CarrierDescriptor,
	/// Postal carrier descriptor.
	pub postal: CarrierDescriptor,
}
impl CarrierDescriptors {
	/// Production descriptors for both carriers.
	pub fn production() -> Result<Self, CarrierDescriptorError> {
		Ok(Self {
			ground: CarrierDescriptor::production(Carrier::Ground)?,
			postal: CarrierDescriptor::production(Carrier::Postal)?,
		})
	}

	/// Returns the descriptor for a carrier.
	pub fn get(&self, carrier: Carrier) -> &CarrierDescriptor {
		match carrier {
			Carrier::Ground => &self.ground,
			Carrier::Postal => &self.postal,
		}
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, CarrierDescriptorError> {
	Url::parse(raw)
		.map_err(|source| CarrierDescriptorError::InvalidUrl { endpoint, url: raw.into(), source })
}
