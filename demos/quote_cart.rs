//! Quotes a small cart against mock ground and postal carriers with the default reqwest
//! transport, then prints the options a shopper would see.

// std
use std::{collections::BTreeMap, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use carrier_rates::{
	carrier::{Carrier, CarrierDescriptor, CarrierDescriptors, TokenAuthStyle},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	package::{Address, CartItem, CartPackage},
	quoter::RateQuoter,
	rating::CarrierClient,
	reqwest::Client,
	settings::ShippingSettings,
	store::MemoryTokenStore,
	token::TokenCache,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/ground/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"demo-ground","expires_in":"14399"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/ground/rate");
			then.status(200).header("content-type", "application/json").body(
				r#"{"RateResponse":{"RatedShipment":{"TotalCharges":{"MonetaryValue":"18.40"}}}}"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"demo-postal","expires_in":3599}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/rate");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"totalBasePrice":9.85}"#);
		})
		.await;

	let settings: BTreeMap<String, String> = [
		("ground_client_id", "demo-ground-id"),
		("ground_client_secret", "demo-ground-secret"),
		("ground_account_number", "DEMO01"),
		("postal_client_id", "demo-postal-key"),
		("postal_client_secret", "demo-postal-secret"),
		("origin_city", "Round Rock"),
		("origin_state", "TX"),
		("origin_postal_code", "78664"),
		("ground_markup_percent", "7.5"),
		("postal_class_slug", "letters"),
	]
	.into_iter()
	.map(|(key, value)| (key.to_owned(), value.to_owned()))
	.collect();
	let settings = Arc::new(ShippingSettings::from_map(&settings)?);
	let descriptor = |carrier, path: &str, style| -> Result<CarrierDescriptor> {
		Ok(CarrierDescriptor::builder(carrier)
			.token_endpoint(Url::parse(&server.url(format!("/{path}/token")))?)
			.rating_endpoint(Url::parse(&server.url(format!("/{path}/rate")))?)
			.token_auth(style)
			.build()?)
	};
	let descriptors = CarrierDescriptors {
		ground: descriptor(Carrier::Ground, "ground", TokenAuthStyle::BasicForm)?,
		postal: descriptor(Carrier::Postal, "postal", TokenAuthStyle::JsonBody)?,
	};
	let http_client = Arc::new(ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	));
	let mapper = Arc::new(ReqwestTransportErrorMapper);
	let tokens = TokenCache::with_http_client(
		Arc::new(MemoryTokenStore::default()),
		descriptors,
		settings.clone(),
		http_client.clone(),
		mapper.clone(),
	);
	let client = CarrierClient::new(tokens, settings, http_client, mapper);
	let quoter = RateQuoter::new(Arc::new(client));
	let cart = CartPackage {
		destination: Address {
			city: "Austin".into(),
			state: "TX".into(),
			postal_code: "78701".into(),
			country_code: "US".into(),
		},
		items: vec![
			CartItem::new("notebook", 1.2, 2).with_dimensions(11.0, 8.5, 1.0),
			CartItem::new("postcards", 0.3, 1).with_shipping_class("letters"),
		],
	};

	for option in quoter.quote(&cart, &[]).await {
		println!("{}: {} ({})", option.id, option.cost, option.label);
	}

	Ok(())
}
