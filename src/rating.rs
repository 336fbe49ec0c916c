//! Carrier rate fetching: token → payload → POST → total → markup.
//!
//! [`CarrierClient::fetch_rates`] never fails. Every stage failure is typed inside
//! [`CarrierClient::try_fetch_rates`] and then collapsed into an empty result plus the
//! carrier's "last notice", so a broken carrier only ever means fewer shipping options.

// crates.io
use oauth2::http::{
	Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	carrier::{Carrier, RateRequestContext, Service, UNKNOWN_ERROR},
	classify,
	error::ConfigError,
	http::{self, CarrierHttpClient},
	oauth::TransportErrorMapper,
	obs::{self, DebugFact, DebugLog, DebugSink, NoticeBoard, Outcome, QuoteSpan, TracingSink},
	package::Package,
	quote::{self, RateQuote, RateQuotes},
	settings::ShippingSettings,
	token::TokenCache,
};
#[cfg(feature = "reqwest")]
use crate::{
	carrier::CarrierDescriptors, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper,
	store::MemoryTokenStore,
};

const TRANSACTION_ID_LEN: usize = 16;

#[cfg(feature = "reqwest")]
/// Rating client specialized for the crate's default reqwest transport stack.
pub type ReqwestCarrierClient = CarrierClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Prices packages against both carriers.
pub struct CarrierClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	tokens: TokenCache<C, M>,
	settings: Arc<ShippingSettings>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	notices: NoticeBoard,
	debug: DebugLog,
}
impl<C, M> CarrierClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client sharing the token cache's transport.
	///
	/// Debug facts go to a [`TracingSink`] when the settings enable debug mode.
	pub fn new(
		tokens: TokenCache<C, M>,
		settings: Arc<ShippingSettings>,
		http_client: Arc<C>,
		transport_mapper: Arc<M>,
	) -> Self {
		let debug = DebugLog::new(settings.debug_mode, Arc::new(TracingSink));

		Self {
			tokens,
			settings,
			http_client,
			transport_mapper,
			notices: NoticeBoard::default(),
			debug,
		}
	}

	/// Shares an existing notice board.
	pub fn with_notices(mut self, notices: NoticeBoard) -> Self {
		self.notices = notices;

		self
	}

	/// Routes debug facts to `sink` (still gated by the debug-mode setting).
	pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
		self.debug = DebugLog::new(self.settings.debug_mode, sink);

		self
	}

	/// Token cache backing this client.
	pub fn tokens(&self) -> &TokenCache<C, M> {
		&self.tokens
	}

	/// Settings in effect.
	pub fn settings(&self) -> &ShippingSettings {
		&self.settings
	}

	/// Per-carrier failure notices.
	pub fn notices(&self) -> &NoticeBoard {
		&self.notices
	}

	/// Debug-mode gated fact log.
	pub fn debug_log(&self) -> &DebugLog {
		&self.debug
	}

	/// Quotes `service` for `package`; failures yield an empty map and a carrier notice.
	pub async fn fetch_rates(&self, package: &Package, service: Service) -> RateQuotes {
		let carrier = service.carrier();
		let span = QuoteSpan::new("rate", Some(carrier));

		obs::record_quote_outcome(carrier, Outcome::Attempt);

		span.instrument(async move {
			match self.try_fetch_rates(package, service).await {
				Ok(quotes) => {
					self.notices.clear(carrier);
					obs::record_quote_outcome(carrier, Outcome::Success);

					quotes
				},
				Err(Error::InvalidPackage { weight }) => {
					self.debug.record(
						"rating",
						DebugFact::new("rate_skipped", carrier).with("weight", weight),
					);
					obs::record_quote_outcome(carrier, Outcome::Skipped);

					RateQuotes::new()
				},
				Err(err) => {
					obs::log_carrier_failure(carrier, &err);
					self.notices.post(carrier, err.to_string());
					self.debug.record(
						"rating",
						DebugFact::new("rate_error", &err).with("carrier", carrier),
					);
					obs::record_quote_outcome(carrier, Outcome::Failure);

					RateQuotes::new()
				},
			}
		})
		.await
	}

	/// Same as [`fetch_rates`](Self::fetch_rates) but keeps the failure typed.
	pub async fn try_fetch_rates(&self, package: &Package, service: Service) -> Result<RateQuotes> {
		if !package.is_rateable() {
			return Err(Error::InvalidPackage { weight: package.weight });
		}

		let carrier = service.carrier();
		let strategy = carrier.strategy();
		let token = self.tokens.token(carrier).await?;
		let classification = (carrier == Carrier::Postal)
			.then(|| classify::classify(package.weight, package.dimensions));

		if let Some(verdict) = &classification {
			self.debug.record(
				"rating",
				DebugFact::new("processing_category", verdict.category)
					.with("length_plus_girth", verdict.length_plus_girth)
					.with("reasons", verdict.reasons.join("; ")),
			);
		}

		let origin = self.settings.origin();
		let transaction_id = transaction_id();
		let ctx = RateRequestContext {
			package,
			service,
			origin: &origin,
			origin_street: &self.settings.origin_address1,
			account_number: &self.settings.ground_account_number,
			classification: classification.as_ref(),
			transaction_id: &transaction_id,
		};
		let endpoint = &self.tokens.descriptors().get(carrier).endpoints.rating;
		let payload =
			serde_json::to_vec(&strategy.rate_payload(&ctx)).map_err(ConfigError::PayloadEncode)?;
		let mut builder = oauth2::http::Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(AUTHORIZATION, token.bearer())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json");

		for (name, value) in strategy.rate_headers(&ctx) {
			builder = builder.header(name, value);
		}

		let request = builder.body(payload).map_err(ConfigError::from)?;

		self.debug.record(
			"rating",
			DebugFact::new("rate_request", endpoint)
				.with("service", service.code())
				.with("transaction_id", &transaction_id),
		);

		let response = http::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			carrier,
			request,
			self.settings.request_timeout(),
		)
		.await?;
		let body = response.json();

		self.debug.record(
			"rating",
			DebugFact::new("rate_response", response.status)
				.with("body", String::from_utf8_lossy(&response.body)),
		);

		if !response.is_ok() {
			let message = body
				.as_ref()
				.and_then(|body| strategy.rate_error_message(body))
				.unwrap_or_else(|| UNKNOWN_ERROR.into());

			return Err(Error::UpstreamRejected { carrier, status: response.status, message });
		}

		let body = body.ok_or_else(|| Error::MalformedResponse {
			carrier,
			reason: "response body is not JSON".into(),
		})?;
		let total = strategy.extract_total(&body).ok_or_else(|| Error::MalformedResponse {
			carrier,
			reason: format!("{} missing", strategy.total_field()),
		})?;
		let amount = quote::parse_amount(total).ok_or_else(|| Error::MalformedResponse {
			carrier,
			reason: format!("{} is not a valid amount", strategy.total_field()),
		})?;
		let quote = RateQuote::new(service, amount, self.settings.markup_for(service));

		self.debug.record(
			"rating",
			DebugFact::new("rate_quote", &quote.service_label)
				.with("original", quote.original_amount)
				.with("markup_percent", quote.markup_percent)
				.with("adjusted", quote.adjusted_amount),
		);

		Ok(RateQuotes::from([(quote.service_label.clone(), quote)]))
	}
}
#[cfg(feature = "reqwest")]
impl CarrierClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Production client: carrier endpoints, in-memory token store, reqwest transport with the
	/// configured timeout.
	pub fn from_settings(settings: ShippingSettings) -> Result<Self, ConfigError> {
		let settings = Arc::new(settings);
		let http_client = Arc::new(ReqwestHttpClient::with_timeout(settings.request_timeout())?);
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let tokens = TokenCache::with_http_client(
			Arc::new(MemoryTokenStore::default()),
			CarrierDescriptors::production()?,
			settings.clone(),
			http_client.clone(),
			mapper.clone(),
		);

		Ok(Self::new(tokens, settings, http_client, mapper))
	}
}
impl<C, M> Debug for CarrierClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CarrierClient")
			.field("tokens", &self.tokens)
			.field("debug", &self.debug)
			.finish()
	}
}

fn transaction_id() -> String {
	rand::rng().sample_iter(Alphanumeric).take(TRANSACTION_ID_LEN).map(char::from).collect()
}
