//! Quote-level error types shared across carriers, token exchanges, and configuration.
//!
//! Every variant is recoverable from the shopper's point of view: the rating client collapses
//! them into "no quotes from this carrier" and records the message as the carrier's notice.

// self
use crate::{_prelude::*, carrier::Carrier, store::StoreError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (including missing carrier credentials).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token store failure.
	#[error(transparent)]
	Storage(#[from] StoreError),

	/// Carrier answered with a non-success HTTP status.
	#[error("{carrier} API error (HTTP {status}): {message}.")]
	UpstreamRejected {
		/// Carrier that rejected the call.
		carrier: Carrier,
		/// HTTP status code returned by the carrier.
		status: u16,
		/// Carrier-supplied or synthesized error message.
		message: String,
	},
	/// Carrier answered successfully but without the expected field.
	#[error("{carrier} response is malformed: {reason}.")]
	MalformedResponse {
		/// Carrier whose response could not be used.
		carrier: Carrier,
		/// What was missing or unparsable.
		reason: String,
	},
	/// Package has no chargeable weight; rating is skipped.
	#[error("Package weight must be greater than zero (got {weight}).")]
	InvalidPackage {
		/// Aggregated package weight.
		weight: f64,
	},
	/// Rate probe input failed validation.
	#[error("Rate probe input is invalid: {reason}.")]
	InvalidProbe {
		/// Which field failed validation.
		reason: String,
	},
}
impl Error {
	/// Returns a stable label suitable for metric or log fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Error::Config(ConfigError::MissingCredentials { .. }) => "configuration_missing",
			Error::Config(_) => "configuration",
			Error::Transport(TransportError::Timeout) => "timeout",
			Error::Transport(_) => "transport",
			Error::Storage(_) => "storage",
			Error::UpstreamRejected { .. } => "upstream_rejected",
			Error::MalformedResponse { .. } => "malformed_response",
			Error::InvalidPackage { .. } => "invalid_package",
			Error::InvalidProbe { .. } => "invalid_probe",
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Outgoing payload could not be encoded.
	#[error("Request payload could not be encoded.")]
	PayloadEncode(#[source] serde_json::Error),
	/// Carrier descriptor is invalid.
	#[error(transparent)]
	Descriptor(#[from] crate::carrier::CarrierDescriptorError),
	/// A configuration entry could not be interpreted.
	#[error("Setting `{path}` is invalid.")]
	InvalidSetting {
		/// Dotted path of the offending key.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},

	/// Client id or secret is absent for the carrier.
	#[error("{carrier} credentials are missing; check the client id and client secret.")]
	MissingCredentials {
		/// Carrier without credentials.
		carrier: Carrier,
	},
	/// Token endpoint response omitted `access_token`.
	#[error("{carrier} token response is missing access_token.")]
	MissingAccessToken {
		/// Carrier that issued the response.
		carrier: Carrier,
	},
	/// Token endpoint response omitted or garbled `expires_in`.
	#[error("{carrier} token response is missing a usable expires_in.")]
	MissingExpiresIn {
		/// Carrier that issued the response.
		carrier: Carrier,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, deadline).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the carrier.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The call exceeded its request deadline.
	#[error("Request timed out while calling the carrier.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the carrier.")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure without a typed source.
	#[error("HTTP client error occurred while calling the carrier: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
