//! Postal carrier strategy (ground advantage).

// crates.io
use serde_json::json;
// self
use crate::{
	carrier::{
		Carrier,
		strategy::{CarrierStrategy, RateRequestContext, message_at},
	},
	classify::{self, ProcessingCategory},
};

/// Strategy for the postal carrier's base-rate search API.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostalStrategy;
impl CarrierStrategy for PostalStrategy {
	fn carrier(&self) -> Carrier {
		Carrier::Postal
	}

	fn rate_payload(&self, ctx: &RateRequestContext<'_>) -> serde_json::Value {
		let package = ctx.package;
		let sides = classify::normalize_dimensions(package.dimensions);
		let category = ctx
			.classification
			.map_or(ProcessingCategory::Machinable, |verdict| verdict.category);

		json!({
			"originZIPCode": ctx.origin.postal_code,
			"destinationZIPCode": package.destination.postal_code,
			"weight": package.weight,
			"length": sides.length,
			"width": sides.width,
			"height": sides.height,
			"mailClass": ctx.service.code(),
			"processingCategory": category.as_str(),
			"destinationEntryFacilityType": "NONE",
			"rateIndicator": "SP",
			"priceType": "COMMERCIAL",
		})
	}

	fn total_field(&self) -> &'static str {
		"totalBasePrice"
	}

	fn extract_total<'a>(&self, body: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
		body.get("totalBasePrice")
	}

	fn rate_error_message(&self, body: &serde_json::Value) -> Option<String> {
		message_at(body, "/error/message")
	}

	fn token_error_message(&self, body: &serde_json::Value) -> Option<String> {
		message_at(body, "/error_description").or_else(|| message_at(body, "/error/message"))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		carrier::Service,
		package::{Address, Dimensions, Package},
	};

	#[test]
	fn payload_carries_normalized_sides_and_category() {
		let package = Package {
			weight: 30.0,
			dimensions: Dimensions::new(4.0, 10.0, 6.0),
			destination: Address { postal_code: "10001".into(), ..Default::default() },
			items: Vec::new(),
		};
		let origin = Address { postal_code: "78664".into(), ..Default::default() };
		let verdict = classify::classify(package.weight, package.dimensions);
		let ctx = RateRequestContext {
			package: &package,
			service: Service::PostalGroundAdvantage,
			origin: &origin,
			origin_street: "",
			account_number: "",
			classification: Some(&verdict),
			transaction_id: "tx",
		};
		let payload = PostalStrategy.rate_payload(&ctx);

		assert_eq!(payload["originZIPCode"], "78664");
		assert_eq!(payload["destinationZIPCode"], "10001");
		assert_eq!(payload["length"], 10.0);
		assert_eq!(payload["height"], 4.0);
		assert_eq!(payload["mailClass"], "USPS_GROUND_ADVANTAGE");
		assert_eq!(payload["processingCategory"], "NONSTANDARD");
		assert_eq!(payload["rateIndicator"], "SP");
		assert!(PostalStrategy.rate_headers(&ctx).is_empty());
	}

	#[test]
	fn error_messages_follow_each_endpoint_shape() {
		let token =
			serde_json::json!({ "error": "invalid_client", "error_description": "Bad key." });
		let rate = serde_json::json!({ "error": { "code": "400", "message": "ZIP invalid." } });

		assert_eq!(PostalStrategy.token_error_message(&token).as_deref(), Some("Bad key."));
		assert_eq!(PostalStrategy.rate_error_message(&rate).as_deref(), Some("ZIP invalid."));

		let priced = serde_json::json!({ "totalBasePrice": 7.35 });

		assert_eq!(PostalStrategy.extract_total(&priced), Some(&serde_json::json!(7.35)));
	}
}
