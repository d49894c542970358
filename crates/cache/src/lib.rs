//! In-process cache engine for cachet
//!
//! This crate provides a generic, thread-safe key/value cache with:
//! - Pluggable storage backends (hash map, LRU)
//! - Per-entry metrics (creation time, last access, access count)
//! - An ordered addin pipeline hooked into every cache action
//! - Predicate-driven expiration, on every action or on a timer
//! - Compute-once `get_or_add` among racing callers
//!
//! ```
//! use cachet_cache::{Cache, ExpirationAddin, ExpirationCheckStrategy};
//! use std::sync::Arc;
//!
//! # fn main() -> cachet_cache::Result<()> {
//! let expiration = ExpirationAddin::<String, u32>::new(
//!     ExpirationCheckStrategy::on_every_action(),
//!     |_: &u32, metrics| metrics.access_count() >= 3,
//! )?;
//! let cache: Cache<String, u32> = Cache::builder()
//!     .addin(Arc::new(expiration))
//!     .build()?;
//!
//! cache.set("answer".to_string(), 42)?;
//! assert_eq!(cache.get(&"answer".to_string()), Some(42));
//! # Ok(())
//! # }
//! ```

pub mod addin;
pub mod clock;
pub mod config;
pub mod core;
pub mod entry;
pub mod errors;
pub mod expiration;
pub mod metrics;
pub mod storage;

pub use addin::{
    AddinPipeline, CacheAddin, Flow, Hook, RemovalReason, SweepTarget, SweepTrigger,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheSettings, CacheSettingsBuilder, CacheSettingsLoader, ConfigSource, LoadedSettings,
};
pub use core::{Cache, CacheBuilder, CacheKey, CacheStatsSnapshot, CacheValue};
pub use entry::CacheEntry;
pub use errors::{CacheError, Error, RecoveryHint, Result};
pub use expiration::{
    CheckStrategy, ExpirationAddin, ExpirationCheckStrategy, ExpirationStats, PredicateError,
    TimeCheckStrategy,
};
pub use metrics::{EntryMetrics, MetricsSnapshot};
pub use storage::{create_storage, LruStorage, MemoryStorage, Storage, StorageKind};
