//! Seller configuration read from the host's opaque key→value settings map.
//!
//! The host persists settings however it likes and hands the crate a flat map of strings.
//! [`ShippingSettings::from_map`] interprets that map once; components receive the resulting
//! value explicitly and never look configuration up on their own.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{
	_prelude::*,
	carrier::{Carrier, Service},
	error::ConfigError,
	package::Address,
};

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_TIMEOUT_SECS: u64 = 60;

/// Client credentials for one carrier's token endpoint.
#[derive(Clone, Debug)]
pub struct CarrierCredential {
	/// OAuth 2.0 client identifier.
	pub client_id: ClientId,
	/// OAuth 2.0 client secret; `Debug` output is redacted.
	pub client_secret: ClientSecret,
}

/// Shipping-class slugs that steer routing and free shipping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShippingClasses {
	/// Items in this class force ground-carrier rates.
	pub ground: Option<String>,
	/// Items in this class force postal-carrier rates.
	pub postal: Option<String>,
	/// Items in this class ship free and carry no chargeable weight.
	pub free: Option<String>,
}
impl ShippingClasses {
	/// Returns `true` when `class` equals the configured free-shipping slug.
	pub fn is_free(&self, class: Option<&str>) -> bool {
		matches_slug(self.free.as_deref(), class)
	}

	/// Returns `true` when `class` equals the configured ground slug.
	pub fn is_ground(&self, class: Option<&str>) -> bool {
		matches_slug(self.ground.as_deref(), class)
	}

	/// Returns `true` when `class` equals the configured postal slug.
	pub fn is_postal(&self, class: Option<&str>) -> bool {
		matches_slug(self.postal.as_deref(), class)
	}
}

/// Interpreted seller configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShippingSettings {
	/// Ground carrier client id.
	pub ground_client_id: String,
	/// Ground carrier client secret.
	pub ground_client_secret: String,
	/// Ground carrier shipper account number.
	pub ground_account_number: String,
	/// Postal carrier client id (consumer key).
	pub postal_client_id: String,
	/// Postal carrier client secret (consumer secret).
	pub postal_client_secret: String,
	/// Origin street line.
	pub origin_address1: String,
	/// Origin city.
	pub origin_city: String,
	/// Origin state or province code.
	pub origin_state: String,
	/// Origin postal code.
	pub origin_postal_code: String,
	/// Origin country code.
	pub origin_country: String,
	/// Markup applied to domestic ground quotes, in percent.
	#[serde(deserialize_with = "lenient::percent")]
	pub ground_markup_percent: f64,
	/// Markup applied to international ground quotes, in percent.
	#[serde(deserialize_with = "lenient::percent")]
	pub ground_international_markup_percent: f64,
	/// Markup applied to postal quotes, in percent.
	#[serde(deserialize_with = "lenient::percent")]
	pub postal_markup_percent: f64,
	/// Ground-carrier shipping-class slug.
	pub ground_class_slug: String,
	/// Postal-carrier shipping-class slug.
	pub postal_class_slug: String,
	/// Free-shipping class slug.
	pub free_class_slug: String,
	/// Enables verbose debug facts.
	#[serde(deserialize_with = "lenient::flag")]
	pub debug_mode: bool,
	/// Country treated as domestic; anything else routes to international ground.
	pub domestic_country: String,
	/// Per-call HTTP timeout in seconds.
	#[serde(deserialize_with = "lenient::seconds")]
	pub request_timeout_secs: u64,
}
impl ShippingSettings {
	/// Interprets the host's settings map. Unknown keys are ignored.
	pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
		let value = serde_json::Value::Object(
			map.iter()
				.map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
				.collect(),
		);

		serde_path_to_error::deserialize(value).map_err(|err| ConfigError::InvalidSetting {
			path: err.path().to_string(),
			source: err.into_inner(),
		})
	}

	/// Returns trimmed credentials for the carrier, or an error when either half is empty.
	pub fn credential(&self, carrier: Carrier) -> Result<CarrierCredential, ConfigError> {
		let (id, secret) = match carrier {
			Carrier::Ground => (&self.ground_client_id, &self.ground_client_secret),
			Carrier::Postal => (&self.postal_client_id, &self.postal_client_secret),
		};
		let (id, secret) = (id.trim(), secret.trim());

		if id.is_empty() || secret.is_empty() {
			return Err(ConfigError::MissingCredentials { carrier });
		}

		Ok(CarrierCredential {
			client_id: ClientId::new(id.to_owned()),
			client_secret: ClientSecret::new(secret.to_owned()),
		})
	}

	/// Markup percentage for the requested service.
	pub fn markup_for(&self, service: Service) -> f64 {
		match service {
			Service::GroundDomestic => self.ground_markup_percent,
			Service::GroundInternational => self.ground_international_markup_percent,
			Service::PostalGroundAdvantage => self.postal_markup_percent,
		}
	}

	/// Origin address used by every rate request.
	pub fn origin(&self) -> Address {
		Address {
			city: self.origin_city.clone(),
			state: self.origin_state.clone(),
			postal_code: self.origin_postal_code.clone(),
			country_code: self.origin_country.clone(),
		}
	}

	/// Configured shipping-class slugs; blank entries count as unset.
	pub fn classes(&self) -> ShippingClasses {
		ShippingClasses {
			ground: non_empty(&self.ground_class_slug),
			postal: non_empty(&self.postal_class_slug),
			free: non_empty(&self.free_class_slug),
		}
	}

	/// Returns `true` when `country` is the domestic country.
	pub fn is_domestic(&self, country: &str) -> bool {
		let country = country.trim();

		country.is_empty() || country.eq_ignore_ascii_case(self.domestic_country.trim())
	}

	/// Per-call HTTP timeout, clamped to `1..=60` seconds.
	pub fn request_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.request_timeout_secs.clamp(1, MAX_TIMEOUT_SECS))
	}
}
impl Default for ShippingSettings {
	fn default() -> Self {
		Self {
			ground_client_id: String::new(),
			ground_client_secret: String::new(),
			ground_account_number: String::new(),
			postal_client_id: String::new(),
			postal_client_secret: String::new(),
			origin_address1: String::new(),
			origin_city: String::new(),
			origin_state: String::new(),
			origin_postal_code: String::new(),
			origin_country: "US".into(),
			ground_markup_percent: 0.0,
			ground_international_markup_percent: 0.0,
			postal_markup_percent: 0.0,
			ground_class_slug: String::new(),
			postal_class_slug: String::new(),
			free_class_slug: String::new(),
			debug_mode: false,
			domestic_country: "US".into(),
			request_timeout_secs: DEFAULT_TIMEOUT_SECS,
		}
	}
}

fn non_empty(value: &str) -> Option<String> {
	let value = value.trim();

	(!value.is_empty()).then(|| value.to_owned())
}

fn matches_slug(slug: Option<&str>, class: Option<&str>) -> bool {
	match (slug, class) {
		(Some(slug), Some(class)) => slug == class,
		_ => false,
	}
}

mod lenient {
	//! Settings arrive as strings; these accept both string and native JSON encodings.

	// crates.io
	use serde::{
		Deserializer,
		de::{Error as DeError, Unexpected},
	};
	// self
	use crate::_prelude::*;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Scalar {
		Flag(bool),
		Number(f64),
		Text(String),
	}

	pub(super) fn percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = match Scalar::deserialize(deserializer)? {
			Scalar::Number(value) => value,
			Scalar::Text(text) if text.trim().is_empty() => 0.0,
			Scalar::Text(text) => text
				.trim()
				.trim_end_matches('%')
				.parse::<f64>()
				.map_err(|_| DeError::invalid_value(Unexpected::Str(&text), &"a percentage"))?,
			Scalar::Flag(flag) =>
				return Err(DeError::invalid_type(Unexpected::Bool(flag), &"a percentage")),
		};

		if value.is_finite() {
			Ok(value)
		} else {
			Err(DeError::invalid_value(Unexpected::Float(value), &"a finite percentage"))
		}
	}

	pub(super) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Scalar::deserialize(deserializer)? {
			Scalar::Flag(flag) => Ok(flag),
			Scalar::Number(value) => Ok(value != 0.0),
			Scalar::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" | "on" => Ok(true),
				"" | "0" | "false" | "no" | "off" => Ok(false),
				_ => Err(DeError::invalid_value(Unexpected::Str(&text), &"a boolean flag")),
			},
		}
	}

	pub(super) fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
	where
		D: Deserializer<'de>,
	{
		match Scalar::deserialize(deserializer)? {
			Scalar::Number(value) if value.is_finite() && value >= 0.0 => Ok(value as u64),
			Scalar::Text(text) => text
				.trim()
				.parse::<u64>()
				.map_err(|_| DeError::invalid_value(Unexpected::Str(&text), &"whole seconds")),
			_ => Err(DeError::custom("expected whole seconds")),
		}
	}
}
