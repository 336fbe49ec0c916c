//! Thread-safe in-memory [`TokenStore`] implementation.

// self
use crate::{
	_prelude::*,
	carrier::Carrier,
	store::{StoreError, StoreFuture, TokenStore},
	token::CachedToken,
};

type StoreMap = Arc<RwLock<HashMap<Carrier, CachedToken>>>;

/// Process-local token store shared by every quote in the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(StoreMap);
impl MemoryTokenStore {
	/// Number of carriers with a cached token.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no token is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StoreMap, token: CachedToken) -> Result<(), StoreError> {
		map.write().insert(token.carrier, token);

		Ok(())
	}
}
impl TokenStore for MemoryTokenStore {
	fn save(&self, token: CachedToken) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, token) })
	}

	fn fetch(&self, carrier: Carrier) -> StoreFuture<'_, Option<CachedToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&carrier).cloned()) })
	}

	fn remove(&self, carrier: Carrier) -> StoreFuture<'_, Option<CachedToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(&carrier)) })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::token::AccessToken;

	#[tokio::test]
	async fn save_fetch_and_remove_per_carrier() {
		let store = MemoryTokenStore::default();
		let token = CachedToken::issue(
			Carrier::Postal,
			AccessToken::new("abc"),
			datetime!(2025-01-01 00:00 UTC),
			Duration::hours(1),
		)
		.expect("A one-hour token should be cacheable.");

		store.save(token.clone()).await.expect("Saving should succeed.");

		assert_eq!(store.len(), 1);
		assert_eq!(
			store.fetch(Carrier::Postal).await.expect("Fetching should succeed."),
			Some(token.clone())
		);
		assert_eq!(store.fetch(Carrier::Ground).await.expect("Fetching should succeed."), None);
		assert_eq!(
			store.remove(Carrier::Postal).await.expect("Removing should succeed."),
			Some(token)
		);
		assert!(store.is_empty());
	}
}
