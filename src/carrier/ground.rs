//! Ground carrier strategy (domestic ground + international standard).

// crates.io
use serde_json::json;
// self
use crate::{
	carrier::{
		Carrier, Service,
		strategy::{CarrierStrategy, RateRequestContext, message_at, number_text},
	},
	package::Address,
};

/// Value sent in the `transactionSrc` header.
pub const TRANSACTION_SOURCE: &str = "carrier-rates";

const TOTAL_POINTER: &str = "/RateResponse/RatedShipment/TotalCharges/MonetaryValue";
const TOTAL_POINTER_FIRST: &str = "/RateResponse/RatedShipment/0/TotalCharges/MonetaryValue";
const ERROR_POINTER: &str = "/response/errors/0/message";

/// Strategy for the ground carrier's rating API.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroundStrategy;
impl CarrierStrategy for GroundStrategy {
	fn carrier(&self) -> Carrier {
		Carrier::Ground
	}

	fn rate_payload(&self, ctx: &RateRequestContext<'_>) -> serde_json::Value {
		let package = ctx.package;
		let origin = address(ctx.origin, ctx.origin_street);
		let description = match ctx.service {
			Service::GroundInternational => "UPS Standard",
			_ => "Ground",
		};

		json!({
			"RateRequest": {
				"Request": {
					"TransactionReference": { "CustomerContext": ctx.transaction_id }
				},
				"Shipment": {
					"Shipper": {
						"Name": "Shipper",
						"ShipperNumber": ctx.account_number,
						"Address": origin,
					},
					"ShipTo": {
						"Name": "Recipient",
						"Address": address(&package.destination, ""),
					},
					"ShipFrom": {
						"Name": "Ship From",
						"Address": origin,
					},
					"Service": { "Code": ctx.service.code(), "Description": description },
					"Package": [{
						"PackagingType": { "Code": "02", "Description": "Box" },
						"Dimensions": {
							"UnitOfMeasurement": { "Code": "IN", "Description": "Inches" },
							"Length": number_text(package.dimensions.length),
							"Width": number_text(package.dimensions.width),
							"Height": number_text(package.dimensions.height),
						},
						"PackageWeight": {
							"UnitOfMeasurement": { "Code": "LBS", "Description": "Pounds" },
							"Weight": number_text(package.weight),
						},
					}],
				},
			}
		})
	}

	fn rate_headers(&self, ctx: &RateRequestContext<'_>) -> Vec<(&'static str, String)> {
		vec![
			("transId", ctx.transaction_id.to_owned()),
			("transactionSrc", TRANSACTION_SOURCE.into()),
		]
	}

	fn total_field(&self) -> &'static str {
		"TotalCharges.MonetaryValue"
	}

	fn extract_total<'a>(&self, body: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
		body.pointer(TOTAL_POINTER).or_else(|| body.pointer(TOTAL_POINTER_FIRST))
	}

	fn rate_error_message(&self, body: &serde_json::Value) -> Option<String> {
		message_at(body, ERROR_POINTER)
	}

	fn token_error_message(&self, body: &serde_json::Value) -> Option<String> {
		message_at(body, ERROR_POINTER)
	}
}

fn address(address: &Address, street: &str) -> serde_json::Value {
	json!({
		"AddressLine": [street],
		"City": address.city,
		"StateProvinceCode": address.state,
		"PostalCode": address.postal_code,
		"CountryCode": address.country_code,
	})
}
