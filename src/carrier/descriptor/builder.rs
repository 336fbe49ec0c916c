// self
use crate::{
	_prelude::*,
	carrier::{Carrier, CarrierDescriptor, CarrierEndpoints, TokenAuthStyle},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum CarrierDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Rating endpoint is mandatory.
	#[error("Missing rating endpoint.")]
	MissingRatingEndpoint,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint string could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidUrl {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Raw endpoint string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Builder for [`CarrierDescriptor`] values.
#[derive(Debug)]
pub struct CarrierDescriptorBuilder {
	/// Carrier being described.
	pub carrier: Carrier,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Rating endpoint.
	pub rating_endpoint: Option<Url>,
	/// Token-request style.
	pub token_auth: TokenAuthStyle,
}
impl CarrierDescriptorBuilder {
	/// Creates a new builder seeded with the provided carrier.
	pub fn new(carrier: Carrier) -> Self {
		Self {
			carrier,
			token_endpoint: None,
			rating_endpoint: None,
			token_auth: TokenAuthStyle::default(),
		}
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the rating endpoint.
	pub fn rating_endpoint(mut self, url: Url) -> Self {
		self.rating_endpoint = Some(url);

		self
	}

	/// Overrides the token-request style.
	pub fn token_auth(mut self, style: TokenAuthStyle) -> Self {
		self.token_auth = style;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<CarrierDescriptor, CarrierDescriptorError> {
		let token = self.token_endpoint.ok_or(CarrierDescriptorError::MissingTokenEndpoint)?;
		let rating = self.rating_endpoint.ok_or(CarrierDescriptorError::MissingRatingEndpoint)?;

		validate_endpoint("token", &token)?;
		validate_endpoint("rating", &rating)?;

		Ok(CarrierDescriptor {
			carrier: self.carrier,
			endpoints: CarrierEndpoints { token, rating },
			token_auth: self.token_auth,
		})
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), CarrierDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(CarrierDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	#[test]
	fn rejects_plain_http_for_remote_hosts() {
		let err = CarrierDescriptor::builder(Carrier::Ground)
			.token_endpoint(url("http://carrier.example.com/token"))
			.rating_endpoint(url("https://carrier.example.com/rate"))
			.build()
			.expect_err("Remote plain-HTTP endpoints should be rejected.");

		assert!(matches!(err, CarrierDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn accepts_loopback_http_and_requires_both_endpoints() {
		let descriptor = CarrierDescriptor::builder(Carrier::Postal)
			.token_endpoint(url("http://127.0.0.1:8080/token"))
			.rating_endpoint(url("http://localhost:8080/rate"))
			.token_auth(TokenAuthStyle::JsonBody)
			.build()
			.expect("Loopback endpoints should be accepted.");

		assert_eq!(descriptor.token_auth, TokenAuthStyle::JsonBody);

		let err = CarrierDescriptor::builder(Carrier::Postal)
			.token_endpoint(url("https://carrier.example.com/token"))
			.build()
			.expect_err("Missing rating endpoint should be rejected.");

		assert_eq!(err, CarrierDescriptorError::MissingRatingEndpoint);
	}
}
