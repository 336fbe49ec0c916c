// crates.io
use httpmock::prelude::*;
// self
use carrier_rates::{_preludet::*, carrier::Carrier, store::TokenStore};

const POSTAL_REJECTION: &str =
	r#"{"error":"invalid_client","error_description":"Consumer key is invalid"}"#;

fn token_body(token: &str, expires_in: u32) -> String {
	format!(r#"{{"access_token":"{token}","token_type":"Bearer","expires_in":{expires_in}}}"#)
}

#[tokio::test]
async fn cached_tokens_are_reused_until_the_margin_passes() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("postal-cached", 3600));
		})
		.await;
	let tokens = harness.client.tokens();
	let first = tokens.token(Carrier::Postal).await.expect("First token call should succeed.");
	let second = tokens.token(Carrier::Postal).await.expect("Cached token call should succeed.");

	assert_eq!(first.expose(), "postal-cached");
	assert_eq!(second.expose(), "postal-cached");

	mock.assert_calls_async(1).await;

	let stored = harness
		.store
		.fetch(Carrier::Postal)
		.await
		.expect("Token store fetch should succeed.")
		.expect("Token should be cached.");

	assert_eq!(stored.expires_at - stored.issued_at, Duration::seconds(3540));

	harness.clock.advance(Duration::seconds(3539));
	tokens.token(Carrier::Postal).await.expect("Token within its window should be reused.");

	mock.assert_calls_async(1).await;

	harness.clock.advance(Duration::seconds(1));
	tokens.token(Carrier::Postal).await.expect("Expired token should be refreshed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ground/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("ground-shared", 14399));
		})
		.await;
	let tokens = harness.client.tokens();
	let (first, second) =
		tokio::join!(tokens.token(Carrier::Ground), tokens.token(Carrier::Ground));

	assert_eq!(first.expect("First concurrent call should succeed.").expose(), "ground-shared");
	assert_eq!(second.expect("Second concurrent call should succeed.").expose(), "ground-shared");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn short_lived_tokens_are_returned_but_not_cached() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("postal-brief", 45));
		})
		.await;
	let tokens = harness.client.tokens();

	for _ in 0..2 {
		let token = tokens.token(Carrier::Postal).await.expect("Short-lived token should be used.");

		assert_eq!(token.expose(), "postal-brief");
	}

	assert!(harness.store.is_empty());

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn rejected_exchanges_surface_the_carrier_message() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(401)
				.header("content-type", "application/json")
				.body(POSTAL_REJECTION);
		})
		.await;
	let err = harness
		.client
		.tokens()
		.token(Carrier::Postal)
		.await
		.expect_err("A rejected exchange should fail.");

	match err {
		Error::UpstreamRejected { carrier, status, message } => {
			assert_eq!(carrier, Carrier::Postal);
			assert_eq!(status, 401);
			assert_eq!(message, "Consumer key is invalid");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(harness.store.is_empty());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn invalidation_forces_a_new_exchange() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ground/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("ground-renewed", 14399));
		})
		.await;
	let tokens = harness.client.tokens();

	tokens.token(Carrier::Ground).await.expect("Initial exchange should succeed.");
	tokens.invalidate_all().await.expect("Invalidation should succeed.");

	assert!(harness.store.is_empty());

	tokens.token(Carrier::Ground).await.expect("Exchange after invalidation should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn absurd_lifetimes_are_clamped_instead_of_overflowing() {
	let server = MockServer::start_async().await;
	let harness = build_test_harness(&server.base_url(), settings_with([]));
	let mut huge = server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"postal-forever","expires_in":1e300}"#);
		})
		.await;
	let tokens = harness.client.tokens();
	let token = tokens.token(Carrier::Postal).await.expect("A huge lifetime should be accepted.");

	assert_eq!(token.expose(), "postal-forever");

	let stored = harness
		.store
		.fetch(Carrier::Postal)
		.await
		.expect("Token store fetch should succeed.")
		.expect("Token should be cached.");

	assert_eq!(stored.expires_at - stored.issued_at, Duration::seconds(86_400 - 60));

	huge.delete_async().await;
	tokens.invalidate_all().await.expect("Invalidation should succeed.");

	let negative = server
		.mock_async(|when, then| {
			when.method(POST).path("/postal/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"postal-stale","expires_in":-9223372036854775808}"#);
		})
		.await;
	let token =
		tokens.token(Carrier::Postal).await.expect("A negative lifetime should not panic.");

	assert_eq!(token.expose(), "postal-stale");
	assert!(harness.store.is_empty());

	negative.assert_calls_async(1).await;
}
