//! Client-credentials token exchange wire shapes and transport error mapping.
//!
//! Carriers disagree on how credentials travel (HTTP Basic + form vs. JSON body) and on how
//! `expires_in` is typed, so requests are built and parsed here instead of through a generic
//! OAuth client. Requests still run over the [`oauth2::AsyncHttpClient`] handles exposed by
//! [`crate::http::CarrierHttpClient`].

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	HttpClientError, HttpRequest,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	carrier::{Carrier, CarrierDescriptor, CarrierStrategy, TokenAuthStyle, UNKNOWN_ERROR},
	error::{ConfigError, TransportError},
	http::{CarrierResponse, ResponseMetadata},
	settings::CarrierCredential,
	token::AccessToken,
};

/// Upper bound applied to carrier-declared token lifetimes (one day).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

const GRANT_TYPE: &str = "client_credentials";

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		carrier: Carrier,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		carrier: Carrier,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(carrier, meta, message),
			_ => map_generic_transport_error(carrier, meta, "unrecognized client failure"),
		}
	}
}

/// Token issued by a carrier, before caching.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Bearer token.
	pub access_token: AccessToken,
	/// Lifetime declared by the carrier.
	pub expires_in: Duration,
}

#[derive(Deserialize)]
struct TokenResponseBody {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<ExpiresIn>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
	Seconds(i64),
	Fractional(f64),
	Text(String),
}
impl ExpiresIn {
	/// Declared lifetime clamped to `0..=MAX_TOKEN_LIFETIME_SECS`.
	fn seconds(&self) -> Option<i64> {
		let secs = match self {
			ExpiresIn::Seconds(secs) => *secs,
			// `as` saturates at the `i64` bounds before the clamp below.
			ExpiresIn::Fractional(secs) if secs.is_finite() => secs.trunc() as i64,
			ExpiresIn::Fractional(_) => return None,
			ExpiresIn::Text(text) => text.trim().parse().ok()?,
		};

		Some(secs.clamp(0, MAX_TOKEN_LIFETIME_SECS))
	}
}

/// Builds the client-credentials request in the style the descriptor declares.
pub fn build_token_request(
	descriptor: &CarrierDescriptor,
	credential: &CarrierCredential,
) -> Result<HttpRequest, ConfigError> {
	let builder = oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(descriptor.endpoints.token.as_str())
		.header(ACCEPT, "application/json");
	let request = match descriptor.token_auth {
		TokenAuthStyle::BasicForm => {
			let basic = STANDARD.encode(format!(
				"{}:{}",
				credential.client_id.as_str(),
				credential.client_secret.secret()
			));

			builder
				.header(AUTHORIZATION, format!("Basic {basic}"))
				.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
				.body(format!("grant_type={GRANT_TYPE}").into_bytes())?
		},
		TokenAuthStyle::JsonBody => {
			let body = serde_json::to_vec(&serde_json::json!({
				"client_id": credential.client_id.as_str(),
				"client_secret": credential.client_secret.secret(),
				"grant_type": GRANT_TYPE,
			}))
			.map_err(ConfigError::PayloadEncode)?;

			builder.header(CONTENT_TYPE, "application/json").body(body)?
		},
	};

	Ok(request)
}

/// Interprets a token endpoint response.
///
/// Non-200 responses become [`Error::UpstreamRejected`] carrying the carrier's own message.
/// `expires_in` may be a JSON number or a numeric string; it is clamped to
/// `0..=`[`MAX_TOKEN_LIFETIME_SECS`] so an absurd value yields an uncacheable or day-long token.
pub fn parse_token_response(
	strategy: &dyn CarrierStrategy,
	response: &CarrierResponse,
) -> Result<TokenGrant> {
	let carrier = strategy.carrier();

	if !response.is_ok() {
		let message = response
			.json()
			.and_then(|body| strategy.token_error_message(&body))
			.unwrap_or_else(|| UNKNOWN_ERROR.into());

		return Err(Error::UpstreamRejected { carrier, status: response.status, message });
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let body: TokenResponseBody =
		serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
			Error::MalformedResponse {
				carrier,
				reason: format!("token response at `{}` is invalid: {}", err.path(), err.inner()),
			}
		})?;
	let access_token = body
		.access_token
		.filter(|token| !token.trim().is_empty())
		.ok_or(ConfigError::MissingAccessToken { carrier })?;
	let expires_in = body
		.expires_in
		.as_ref()
		.and_then(ExpiresIn::seconds)
		.ok_or(ConfigError::MissingExpiresIn { carrier })?;

	Ok(TokenGrant {
		access_token: AccessToken::new(access_token),
		expires_in: Duration::seconds(expires_in),
	})
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	carrier: Carrier,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	let message = match meta.and_then(|value| value.status) {
		Some(status) => format!("{carrier} HTTP {status}: {message}"),
		None => format!("{carrier}: {message}"),
	};

	TransportError::Other { message }.into()
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::{ClientId, ClientSecret};
	// self
	use super::*;
	use crate::carrier::{GroundStrategy, PostalStrategy};

	fn credential() -> CarrierCredential {
		CarrierCredential {
			client_id: ClientId::new("id".into()),
			client_secret: ClientSecret::new("secret".into()),
		}
	}

	fn ok(body: &str) -> CarrierResponse {
		CarrierResponse { status: 200, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn ground_requests_use_basic_auth_and_form_body() {
		let descriptor = CarrierDescriptor::production(Carrier::Ground)
			.expect("Ground descriptor should build.");
		let request =
			build_token_request(&descriptor, &credential()).expect("Token request should build.");

		assert_eq!(request.headers()[AUTHORIZATION], "Basic aWQ6c2VjcmV0");
		assert_eq!(request.headers()[CONTENT_TYPE], "application/x-www-form-urlencoded");
		assert_eq!(request.body().as_slice(), b"grant_type=client_credentials");
	}

	#[test]
	fn postal_requests_carry_credentials_in_json() {
		let descriptor = CarrierDescriptor::production(Carrier::Postal)
			.expect("Postal descriptor should build.");
		let request =
			build_token_request(&descriptor, &credential()).expect("Token request should build.");
		let body: serde_json::Value =
			serde_json::from_slice(request.body()).expect("Token body should be JSON.");

		assert!(request.headers().get(AUTHORIZATION).is_none());
		assert_eq!(body["client_id"], "id");
		assert_eq!(body["client_secret"], "secret");
		assert_eq!(body["grant_type"], "client_credentials");
	}

	#[test]
	fn expires_in_accepts_numbers_and_strings() {
		let numeric = parse_token_response(
			&PostalStrategy,
			&ok(r#"{"access_token":"abc","expires_in":3599}"#),
		)
		.expect("Numeric expires_in should parse.");
		let textual = parse_token_response(
			&GroundStrategy,
			&ok(r#"{"access_token":"abc","expires_in":"14399","token_type":"Bearer"}"#),
		)
		.expect("String expires_in should parse.");

		assert_eq!(numeric.expires_in, Duration::seconds(3599));
		assert_eq!(textual.expires_in, Duration::seconds(14399));
		assert_eq!(textual.access_token.expose(), "abc");
	}

	#[test]
	fn out_of_range_lifetimes_are_clamped() {
		let lifetime = |raw: &str| {
			let body = format!(r#"{{"access_token":"abc","expires_in":{raw}}}"#);

			parse_token_response(&PostalStrategy, &ok(&body))
				.expect("Extreme expires_in values should still parse.")
				.expires_in
		};
		let max = Duration::seconds(MAX_TOKEN_LIFETIME_SECS);

		assert_eq!(lifetime("1e300"), max);
		assert_eq!(lifetime(r#""9223372036854775807""#), max);
		assert_eq!(lifetime("-9223372036854775808"), Duration::ZERO);
		assert_eq!(lifetime("-1.5e300"), Duration::ZERO);
	}

	#[test]
	fn missing_fields_are_reported() {
		let no_token = parse_token_response(&PostalStrategy, &ok(r#"{"expires_in":60}"#))
			.expect_err("A response without access_token should fail.");
		let no_expiry = parse_token_response(&PostalStrategy, &ok(r#"{"access_token":"abc"}"#))
			.expect_err("A response without expires_in should fail.");

		assert!(matches!(
			no_token,
			Error::Config(ConfigError::MissingAccessToken { carrier: Carrier::Postal })
		));
		assert!(matches!(
			no_expiry,
			Error::Config(ConfigError::MissingExpiresIn { carrier: Carrier::Postal })
		));
	}

	#[test]
	fn rejections_carry_the_carrier_message() {
		let response = CarrierResponse {
			status: 401,
			body: br#"{"response":{"errors":[{"message":"Invalid Authentication Information."}]}}"#
				.to_vec(),
		};
		let err = parse_token_response(&GroundStrategy, &response)
			.expect_err("A 401 token response should fail.");

		match err {
			Error::UpstreamRejected { carrier, status, message } => {
				assert_eq!(carrier, Carrier::Ground);
				assert_eq!(status, 401);
				assert_eq!(message, "Invalid Authentication Information.");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		let bare = CarrierResponse { status: 500, body: b"oops".to_vec() };

		assert!(matches!(
			parse_token_response(&PostalStrategy, &bare),
			Err(Error::UpstreamRejected { ref message, .. }) if message == UNKNOWN_ERROR
		));
	}
}
