//! Storage contract and the built-in store for cached carrier tokens.

pub mod memory;

pub use memory::MemoryTokenStore;

// self
use crate::{_prelude::*, carrier::Carrier, token::CachedToken};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend for cached carrier tokens.
///
/// Writes are last-writer-wins; tokens are fungible, so concurrent refreshes may overwrite each
/// other freely.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the carrier's token.
	fn save(&self, token: CachedToken) -> StoreFuture<'_, ()>;

	/// Fetches the carrier's token, expired or not.
	fn fetch(&self, carrier: Carrier) -> StoreFuture<'_, Option<CachedToken>>;

	/// Drops the carrier's token, returning it when present.
	fn remove(&self, carrier: Carrier) -> StoreFuture<'_, Option<CachedToken>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Token store failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_crate_error() {
		let store_error = StoreError::Backend { message: "cache unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert_eq!(error.kind(), "storage");
		assert!(error.to_string().contains("cache unreachable"));
		assert_eq!(error.to_string(), store_error.to_string());
	}
}
