// self
use crate::_prelude::*;

/// Single structured debug record (`key = value`, plus optional named fields).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DebugFact {
	/// Stable fact key.
	pub key: &'static str,
	/// Primary value.
	pub value: String,
	/// Additional named values, in insertion order.
	pub fields: Vec<(&'static str, String)>,
}
impl DebugFact {
	/// Creates a fact.
	pub fn new(key: &'static str, value: impl Display) -> Self {
		Self { key, value: value.to_string(), fields: Vec::new() }
	}

	/// Attaches a named value.
	pub fn with(mut self, name: &'static str, value: impl Display) -> Self {
		self.fields.push((name, value.to_string()));

		self
	}

	/// Looks up a named value.
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.iter().find(|(field, _)| *field == name).map(|(_, value)| value.as_str())
	}
}
impl Display for DebugFact {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}={}", self.key, self.value)?;

		for (name, value) in &self.fields {
			write!(f, " {name}={value}")?;
		}

		Ok(())
	}
}

/// A computed value plus the debug facts gathered while computing it.
#[derive(Clone, Debug, PartialEq)]
pub struct Traced<T> {
	/// Computed value.
	pub value: T,
	/// Facts describing how the value was computed.
	pub facts: Vec<DebugFact>,
}
impl<T> Traced<T> {
	/// Pairs a value with its facts.
	pub fn new(value: T, facts: Vec<DebugFact>) -> Self {
		Self { value, facts }
	}

	/// Forwards the facts to `log` under `component` and returns the value.
	pub fn emit(self, log: &DebugLog, component: &'static str) -> T {
		log.extend(component, self.facts);

		self.value
	}
}

/// Consumer of debug facts (log pipeline, admin debug panel, test recorder).
pub trait DebugSink
where
	Self: Send + Sync,
{
	/// Receives one fact produced by `component`.
	fn record(&self, component: &'static str, fact: &DebugFact);
}

/// Sink that emits every fact as a `DEBUG` tracing event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;
impl DebugSink for TracingSink {
	fn record(&self, component: &'static str, fact: &DebugFact) {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!(component, key = fact.key, value = %fact.value, "{fact}");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (component, fact);
		}
	}
}

/// Sink that keeps facts in memory, e.g. for an admin debug panel.
#[derive(Debug, Default)]
pub struct MemorySink(Mutex<Vec<(&'static str, DebugFact)>>);
impl MemorySink {
	/// Returns a copy of every recorded fact with its component.
	pub fn facts(&self) -> Vec<(&'static str, DebugFact)> {
		self.0.lock().clone()
	}

	/// Returns the recorded facts with the given key.
	pub fn facts_with_key(&self, key: &str) -> Vec<DebugFact> {
		self.0
			.lock()
			.iter()
			.filter(|(_, fact)| fact.key == key)
			.map(|(_, fact)| fact.clone())
			.collect()
	}
}
impl DebugSink for MemorySink {
	fn record(&self, component: &'static str, fact: &DebugFact) {
		self.0.lock().push((component, fact.clone()));
	}
}

/// Debug-mode gate in front of a [`DebugSink`].
#[derive(Clone)]
pub struct DebugLog {
	enabled: bool,
	sink: Arc<dyn DebugSink>,
}
impl DebugLog {
	/// Creates a log that forwards to `sink` only when `enabled`.
	pub fn new(enabled: bool, sink: Arc<dyn DebugSink>) -> Self {
		Self { enabled, sink }
	}

	/// Forwards one fact.
	pub fn record(&self, component: &'static str, fact: DebugFact) {
		if self.enabled {
			self.sink.record(component, &fact);
		}
	}

	/// Forwards a batch of facts.
	pub fn extend(&self, component: &'static str, facts: impl IntoIterator<Item = DebugFact>) {
		if self.enabled {
			for fact in facts {
				self.sink.record(component, &fact);
			}
		}
	}
}
impl Debug for DebugLog {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DebugLog").field("enabled", &self.enabled).finish()
	}
}
