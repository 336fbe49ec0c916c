//! Observability helpers for quoting.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `carrier_rates.quote` with the `stage` and
//!   `carrier` fields, failure events at `WARN`, and debug facts at `DEBUG` via [`TracingSink`].
//! - Enable `metrics` to increment the `carrier_rates_quote_total` and `carrier_rates_token_total`
//!   counters, labeled by `carrier` + `outcome`.
//!
//! Debug facts are plain data: components return them inside [`Traced`] and the caller forwards
//! them to a [`DebugSink`] only when the seller enabled debug mode.

mod debug;
mod metrics;
mod notice;
mod tracing;

pub use debug::*;
pub use metrics::*;
pub use notice::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for quote and token attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a carrier call.
	Attempt,
	/// Result served from cache without network I/O.
	Cached,
	/// Successful completion.
	Success,
	/// Call skipped before any network I/O (nothing to rate).
	Skipped,
	/// Failure collapsed into an empty result.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Cached => "cached",
			Outcome::Success => "success",
			Outcome::Skipped => "skipped",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
