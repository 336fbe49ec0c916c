//! Live ground + postal carrier shipping quotes for checkouts: cached OAuth 2.0 client
//! credentials, markup-aware rating, and cart-driven rate selection in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod carrier;
pub mod classify;
pub mod error;
pub mod filter;
pub mod http;
pub mod method;
pub mod oauth;
pub mod obs;
pub mod package;
pub mod quote;
pub mod quoter;
pub mod rating;
pub mod settings;
pub mod store;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::BTreeMap as Map;
	// self
	use crate::{
		carrier::{Carrier, CarrierDescriptor, CarrierDescriptors, TokenAuthStyle},
		http::ReqwestHttpClient,
		obs::{MemorySink, NoticeBoard},
		oauth::ReqwestTransportErrorMapper,
		quoter::RateQuoter,
		rating::CarrierClient,
		settings::ShippingSettings,
		store::MemoryTokenStore,
		token::{Clock, TokenCache},
	};

	/// Carrier client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = CarrierClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Clock that only moves when a test advances it.
	#[derive(Clone, Debug)]
	pub struct ManualClock(Arc<Mutex<OffsetDateTime>>);
	impl ManualClock {
		/// Starts the clock at the provided instant.
		pub fn starting_at(instant: OffsetDateTime) -> Self {
			Self(Arc::new(Mutex::new(instant)))
		}

		/// Moves the clock forward.
		pub fn advance(&self, by: Duration) {
			*self.0.lock() += by;
		}
	}
	impl Clock for ManualClock {
		fn now(&self) -> OffsetDateTime {
			*self.0.lock()
		}
	}

	/// Everything an integration test needs to observe a carrier client.
	#[derive(Debug)]
	pub struct TestHarness {
		/// Client under test.
		pub client: Arc<ReqwestTestClient>,
		/// Backing token store.
		pub store: Arc<MemoryTokenStore>,
		/// Notice board shared with the client.
		pub notices: NoticeBoard,
		/// Debug sink shared with the client.
		pub sink: Arc<MemorySink>,
		/// Clock driving token expiry.
		pub clock: ManualClock,
	}
	impl TestHarness {
		/// Wraps the harness client in a [`RateQuoter`].
		pub fn quoter(&self) -> RateQuoter<ReqwestHttpClient, ReqwestTransportErrorMapper> {
			RateQuoter::new(self.client.clone())
		}
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds descriptors for both carriers pointing at a mock server base URL.
	pub fn mock_descriptors(base_url: &str) -> CarrierDescriptors {
		let url = |path: &str| {
			Url::parse(&format!("{base_url}{path}")).expect("Failed to parse mock carrier URL.")
		};
		let ground = CarrierDescriptor::builder(Carrier::Ground)
			.token_endpoint(url("/ground/token"))
			.rating_endpoint(url("/ground/rate"))
			.token_auth(TokenAuthStyle::BasicForm)
			.build()
			.expect("Mock ground descriptor should build.");
		let postal = CarrierDescriptor::builder(Carrier::Postal)
			.token_endpoint(url("/postal/token"))
			.rating_endpoint(url("/postal/rate"))
			.token_auth(TokenAuthStyle::JsonBody)
			.build()
			.expect("Mock postal descriptor should build.");

		CarrierDescriptors { ground, postal }
	}

	/// Settings map with credentials for both carriers and the given extra entries.
	pub fn settings_with<'a>(
		extra: impl IntoIterator<Item = (&'a str, &'a str)>,
	) -> ShippingSettings {
		let mut map: Map<String, String> = [
			("ground_client_id", "ground-id"),
			("ground_client_secret", "ground-secret"),
			("ground_account_number", "A1B2C3"),
			("postal_client_id", "postal-id"),
			("postal_client_secret", "postal-secret"),
			("origin_address1", "100 Main St"),
			("origin_city", "Round Rock"),
			("origin_state", "TX"),
			("origin_postal_code", "78664"),
			("debug_mode", "1"),
		]
		.into_iter()
		.map(|(key, value)| (key.to_owned(), value.to_owned()))
		.collect();

		for (key, value) in extra {
			map.insert(key.to_owned(), value.to_owned());
		}

		ShippingSettings::from_map(&map).expect("Test settings should parse.")
	}

	/// Constructs a [`CarrierClient`] backed by an in-memory token store, a manual clock, and
	/// the reqwest transport used across integration tests.
	pub fn build_test_harness(base_url: &str, settings: ShippingSettings) -> TestHarness {
		let store = Arc::new(MemoryTokenStore::default());
		let clock = ManualClock::starting_at(OffsetDateTime::now_utc());
		let notices = NoticeBoard::default();
		let sink = Arc::new(MemorySink::default());
		let http_client = Arc::new(test_reqwest_http_client());
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let settings = Arc::new(settings);
		let tokens = TokenCache::with_http_client(
			store.clone(),
			mock_descriptors(base_url),
			settings.clone(),
			http_client.clone(),
			mapper.clone(),
		)
		.with_clock(Arc::new(clock.clone()));
		let client = CarrierClient::new(tokens, settings, http_client, mapper)
			.with_notices(notices.clone())
			.with_debug_sink(sink.clone());

		TestHarness { client: Arc::new(client), store, notices, sink, clock }
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use rust_decimal::Decimal;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use rust_decimal;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
