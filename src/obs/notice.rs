// self
use crate::{_prelude::*, carrier::Carrier};

/// Last failure notice per carrier, surfaced to debug and probe views.
///
/// Posting overwrites the previous notice for the same carrier; a successful quote clears it.
#[derive(Clone, Debug, Default)]
pub struct NoticeBoard(Arc<RwLock<HashMap<Carrier, String>>>);
impl NoticeBoard {
	/// Replaces the carrier's notice.
	pub fn post(&self, carrier: Carrier, notice: impl Into<String>) {
		self.0.write().insert(carrier, notice.into());
	}

	/// Returns the carrier's current notice, if any.
	pub fn get(&self, carrier: Carrier) -> Option<String> {
		self.0.read().get(&carrier).cloned()
	}

	/// Removes the carrier's notice.
	pub fn clear(&self, carrier: Carrier) {
		self.0.write().remove(&carrier);
	}

	/// Removes every notice.
	pub fn clear_all(&self) {
		self.0.write().clear();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn notices_overwrite_per_carrier() {
		let board = NoticeBoard::default();

		board.post(Carrier::Ground, "first");
		board.post(Carrier::Ground, "second");
		board.post(Carrier::Postal, "postal");

		assert_eq!(board.get(Carrier::Ground).as_deref(), Some("second"));

		board.clear(Carrier::Ground);

		assert_eq!(board.get(Carrier::Ground), None);
		assert_eq!(board.get(Carrier::Postal).as_deref(), Some("postal"));

		board.clear_all();

		assert_eq!(board.get(Carrier::Postal), None);
	}
}
