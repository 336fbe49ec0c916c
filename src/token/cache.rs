//! Client-credentials token cache with per-carrier singleflight guards.
//!
//! [`TokenCache::token`] serves a cached token while it is valid and otherwise performs one
//! client-credentials exchange against the carrier's token endpoint. Concurrent callers for
//! the same carrier wait on a shared guard and reuse the token the first caller stored instead
//! of stampeding the endpoint. Failures are returned once; nothing is retried here.

// self
use crate::{
	_prelude::*,
	carrier::{Carrier, CarrierDescriptors},
	http::{self, CarrierHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, Outcome, QuoteSpan},
	settings::ShippingSettings,
	store::TokenStore,
	token::{AccessToken, CachedToken},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Source of "now" for expiry checks.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

#[cfg(feature = "reqwest")]
/// Token cache specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenCache = TokenCache<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Obtains and caches bearer tokens for both carriers.
pub struct TokenCache<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	store: Arc<dyn TokenStore>,
	descriptors: CarrierDescriptors,
	settings: Arc<ShippingSettings>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	clock: Arc<dyn Clock>,
	guards: Arc<Mutex<HashMap<Carrier, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> TokenCache<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a cache that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn TokenStore>,
		descriptors: CarrierDescriptors,
		settings: Arc<ShippingSettings>,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
	) -> Self {
		Self {
			store,
			descriptors,
			settings,
			http_client,
			transport_mapper,
			clock: Arc::new(SystemClock),
			guards: Default::default(),
		}
	}

	/// Replaces the clock used for expiry checks.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Descriptors the cache and the rating client share.
	pub fn descriptors(&self) -> &CarrierDescriptors {
		&self.descriptors
	}

	/// Returns a valid token for `carrier`, exchanging credentials when none is cached.
	pub async fn token(&self, carrier: Carrier) -> Result<AccessToken> {
		let span = QuoteSpan::new("token", Some(carrier));

		obs::record_token_outcome(carrier, Outcome::Attempt);

		span.instrument(async move {
			if let Some(token) = self.cached(carrier).await? {
				obs::record_token_outcome(carrier, Outcome::Cached);

				return Ok(token);
			}

			let guard = self.guard(carrier);
			let _singleflight = guard.lock().await;

			// Another caller may have refreshed while this one waited.
			if let Some(token) = self.cached(carrier).await? {
				obs::record_token_outcome(carrier, Outcome::Cached);

				return Ok(token);
			}

			let result = self.exchange(carrier).await;

			match &result {
				Ok(_) => obs::record_token_outcome(carrier, Outcome::Success),
				Err(_) => obs::record_token_outcome(carrier, Outcome::Failure),
			}

			result
		})
		.await
	}

	/// Drops the cached token for `carrier`.
	pub async fn invalidate(&self, carrier: Carrier) -> Result<()> {
		self.store.remove(carrier).await?;

		Ok(())
	}

	/// Drops every cached token.
	pub async fn invalidate_all(&self) -> Result<()> {
		for carrier in Carrier::ALL {
			self.invalidate(carrier).await?;
		}

		Ok(())
	}

	async fn cached(&self, carrier: Carrier) -> Result<Option<AccessToken>> {
		let now = self.clock.now();
		let token = self.store.fetch(carrier).await?;

		Ok(token.filter(|token| token.is_valid_at(now)).map(|token| token.value))
	}

	async fn exchange(&self, carrier: Carrier) -> Result<AccessToken> {
		let credential = self.settings.credential(carrier)?;
		let request = oauth::build_token_request(self.descriptors.get(carrier), &credential)?;
		let response = http::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			carrier,
			request,
			self.settings.request_timeout(),
		)
		.await?;
		let grant = oauth::parse_token_response(carrier.strategy(), &response)?;

		let issued_at = self.clock.now();

		if let Some(record) =
			CachedToken::issue(carrier, grant.access_token.clone(), issued_at, grant.expires_in)
		{
			self.store.save(record).await?;
		}

		Ok(grant.access_token)
	}

	fn guard(&self, carrier: Carrier) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(carrier).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl<C, M> Debug for TokenCache<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache").field("descriptors", &self.descriptors).finish()
	}
}
