//! Per-carrier bearer tokens: the cache record, the redacted secret, and the caching exchanger.

pub mod cache;
pub mod record;
pub mod secret;

pub use cache::*;
pub use record::*;
pub use secret::*;
