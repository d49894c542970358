//! Core cache types and structures

use crate::addin::AddinPipeline;
use crate::clock::Clock;
use crate::errors::CacheError;
use crate::storage::{Storage, StorageKind};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::stats::CacheStats;
use super::timer::SweepTimer;

/// Bounds every cache key satisfies
pub trait CacheKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

/// Bounds every cached value satisfies
///
/// Values are handed out by clone, so large values are usually wrapped in `Arc`.
pub trait CacheValue: Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Send + Sync + 'static {}

/// Outcome of one `get_or_add` build, shared with every caller waiting on it
///
/// Holds the built value, or the error the backend raised while storing it.
pub(super) type BuildSlot<V> = OnceCell<std::result::Result<V, CacheError>>;

/// Thread-safe cache handle
///
/// Clones share the same entries. Background timers stop when the last
/// handle is dropped.
pub struct Cache<K, V> {
    pub(super) inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(super) struct CacheInner<K, V> {
    /// Storage backend; this lock is the cache's critical section
    pub storage: Mutex<Box<dyn Storage<K, V>>>,
    /// Which backend `storage` is
    pub storage_kind: StorageKind,
    /// Attached addins, fixed at construction
    pub pipeline: AddinPipeline<K, V>,
    /// Time source for metrics and sweeps
    pub clock: Arc<dyn Clock>,
    /// Values being constructed by `get_or_add`, one slot per key
    pub in_flight: DashMap<K, Arc<BuildSlot<V>>>,
    /// Statistics
    pub stats: CacheStats,
    /// Background sweep timers
    pub timers: Mutex<Vec<SweepTimer>>,
}

impl<K, V> Drop for CacheInner<K, V> {
    fn drop(&mut self) {
        let timers = std::mem::take(self.timers.get_mut());
        if !timers.is_empty() {
            tracing::debug!(count = timers.len(), "stopping sweep timers");
        }
        // Each timer signals its thread and joins it on drop
        drop(timers);
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("storage", &self.inner.storage_kind.name())
            .field("addins", &self.inner.pipeline.len())
            .field("entry_count", &self.inner.storage.lock().len())
            .finish()
    }
}
