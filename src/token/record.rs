//! Cached token record and its expiry rules.

// self
use crate::{_prelude::*, carrier::Carrier, token::secret::AccessToken};

/// Safety margin subtracted from every carrier-declared lifetime.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Token held in the cache for one carrier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Carrier that issued the token.
	pub carrier: Carrier,
	/// Bearer token; callers must avoid logging it.
	pub value: AccessToken,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Instant from which the token is no longer served (declared lifetime minus the margin).
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a cache entry, or `None` when the lifetime does not outlast [`EXPIRY_MARGIN`] or
	/// the expiry instant is not representable.
	pub fn issue(
		carrier: Carrier,
		value: AccessToken,
		issued_at: OffsetDateTime,
		lifetime: Duration,
	) -> Option<Self> {
		let effective = lifetime.checked_sub(EXPIRY_MARGIN).filter(|left| left.is_positive())?;
		let expires_at = issued_at.checked_add(effective)?;

		Some(Self { carrier, value, issued_at, expires_at })
	}

	/// Returns `true` when the token may still be served at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("carrier", &self.carrier)
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn expiry_subtracts_the_margin() {
		let issued_at = datetime!(2025-01-01 00:00 UTC);
		let value = AccessToken::new("t");
		let token = CachedToken::issue(Carrier::Ground, value, issued_at, Duration::hours(1))
			.expect("A one-hour token should be cacheable.");

		assert_eq!(token.expires_at, datetime!(2025-01-01 00:59 UTC));
		assert!(token.is_valid_at(datetime!(2025-01-01 00:58:59 UTC)));
		assert!(!token.is_valid_at(datetime!(2025-01-01 00:59 UTC)));
	}

	#[test]
	fn short_lifetimes_are_not_cacheable() {
		let issued_at = datetime!(2025-01-01 00:00 UTC);

		assert!(
			CachedToken::issue(Carrier::Postal, AccessToken::new("t"), issued_at, EXPIRY_MARGIN)
				.is_none()
		);

		let value = AccessToken::new("t");
		let token = CachedToken::issue(Carrier::Postal, value, issued_at, Duration::hours(8));

		assert!(format!("{token:?}").contains("<redacted>"));
	}

	#[test]
	fn unrepresentable_lifetimes_are_not_cacheable() {
		let issued_at = datetime!(2025-01-01 00:00 UTC);

		for lifetime in [Duration::MIN, Duration::MAX, Duration::seconds(i64::MIN)] {
			assert!(
				CachedToken::issue(Carrier::Postal, AccessToken::new("t"), issued_at, lifetime)
					.is_none()
			);
		}
	}
}
