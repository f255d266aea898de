//! In-memory response cache and the seam live fetches pass through.
//!
//! ## Core types
//!
//! - [`CacheEntry`]: an immutable snapshot of one successful response plus
//!   its absolute expiry.
//! - [`CacheStore`]: concurrency-safe key → entry map with no capacity bound.
//! - [`Flight`]: the single point every live fetch passes through.
//!
//! Staleness is interpreted by callers via [`CacheEntry::is_fresh`]; the store
//! itself never evicts.

pub mod entry;
pub mod flight;
pub mod store;

pub use entry::CacheEntry;
pub use flight::Flight;
pub use store::CacheStore;
