//! Carrier strategy hooks that shape rate payloads and read carrier responses.
//!
//! Implementations only see crate-owned data (package, addresses, JSON bodies) so the rating
//! client stays the single place that talks to the HTTP stack.

// self
use crate::{
	_prelude::*,
	carrier::{Carrier, Service},
	classify::Classification,
	package::{Address, Package},
};

/// Message recorded when a carrier error body carries no readable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Strategy hook implemented once per carrier.
///
/// Only the payload and total extraction are mandatory; the header and error-message hooks
/// default to "nothing carrier-specific".
pub trait CarrierStrategy
where
	Self: Send + Sync,
{
	/// Carrier this strategy speaks for.
	fn carrier(&self) -> Carrier;

	/// Builds the JSON body of a rate request.
	fn rate_payload(&self, ctx: &RateRequestContext<'_>) -> serde_json::Value;

	/// Extra headers for the rate request (besides bearer auth and content type).
	fn rate_headers(&self, _ctx: &RateRequestContext<'_>) -> Vec<(&'static str, String)> {
		Vec::new()
	}

	/// Name of the total-charge field, used in "missing field" notices.
	fn total_field(&self) -> &'static str;

	/// Locates the total-charge value in a successful rate response.
	fn extract_total<'a>(&self, body: &'a serde_json::Value) -> Option<&'a serde_json::Value>;

	/// Reads the carrier's error message from a rejected rate response.
	fn rate_error_message(&self, _body: &serde_json::Value) -> Option<String> {
		None
	}

	/// Reads the carrier's error message from a rejected token response.
	fn token_error_message(&self, _body: &serde_json::Value) -> Option<String> {
		None
	}
}

/// Everything a strategy needs to shape one rate request.
#[derive(Clone, Debug)]
pub struct RateRequestContext<'a> {
	/// Package being rated.
	pub package: &'a Package,
	/// Requested service tier.
	pub service: Service,
	/// Origin address from configuration.
	pub origin: &'a Address,
	/// Origin street line.
	pub origin_street: &'a str,
	/// Shipper account number (ground carrier only).
	pub account_number: &'a str,
	/// Handling classification (postal carrier only).
	pub classification: Option<&'a Classification>,
	/// Per-request transaction identifier.
	pub transaction_id: &'a str,
}

/// Reads a non-empty string at a JSON pointer.
pub(crate) fn message_at(body: &serde_json::Value, pointer: &str) -> Option<String> {
	body.pointer(pointer)
		.and_then(serde_json::Value::as_str)
		.map(str::trim)
		.filter(|message| !message.is_empty())
		.map(str::to_owned)
}

/// Renders a number the way carriers expect it in string-typed fields (`6`, not `6.0`).
pub(crate) fn number_text(value: f64) -> String {
	value.to_string()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn message_at_skips_blank_messages() {
		let body = serde_json::json!({ "error": { "message": "  " }, "ok": { "message": "boom" } });

		assert_eq!(message_at(&body, "/error/message"), None);
		assert_eq!(message_at(&body, "/ok/message").as_deref(), Some("boom"));
		assert_eq!(number_text(6.0), "6");
		assert_eq!(number_text(2.5), "2.5");
	}
}
