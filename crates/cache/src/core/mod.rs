//! The cache facade
//!
//! Wires a storage backend, per-entry metrics and an addin pipeline behind
//! a small synchronous API. One exclusive section per cache guards the
//! backend and metrics; sweeps take a key snapshot and then evict one
//! entry per critical section. `get_or_add` factories run outside it, so
//! slow construction for one key never blocks another.

mod builder;
mod inner;
mod operations;
mod stats;
mod sweep;
mod timer;
mod types;

pub use builder::CacheBuilder;
pub use stats::CacheStatsSnapshot;
pub use types::{Cache, CacheKey, CacheValue};

#[cfg(test)]
mod tests;
