// self
use crate::{carrier::Carrier, obs::Outcome};

/// Records a rate-fetch outcome via the global metrics recorder (when enabled).
pub fn record_quote_outcome(carrier: Carrier, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"carrier_rates_quote_total",
			"carrier" => carrier.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (carrier, outcome);
	}
}

/// Records a token acquisition outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(carrier: Carrier, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"carrier_rates_token_total",
			"carrier" => carrier.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (carrier, outcome);
	}
}
