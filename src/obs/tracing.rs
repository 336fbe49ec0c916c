// self
use crate::{_prelude::*, carrier::Carrier};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedQuote<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedQuote<F> = F;

/// A span builder used around carrier calls and rate selection.
#[derive(Clone, Debug)]
pub struct QuoteSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl QuoteSpan {
	/// Creates a new span tagged with the provided stage and, when relevant, carrier.
	pub fn new(stage: &'static str, carrier: Option<Carrier>) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"carrier_rates.quote",
				stage,
				carrier = carrier.map(Carrier::as_str)
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, carrier);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedQuote<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a carrier failure that is about to be collapsed into an empty result.
pub fn log_carrier_failure(carrier: Carrier, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(carrier = carrier.as_str(), kind = error.kind(), "{error}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (carrier, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn failures_log_without_subscriber() {
		log_carrier_failure(Carrier::Ground, &Error::InvalidPackage { weight: 0.0 });
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = QuoteSpan::new("instrument_wraps_future", None);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
