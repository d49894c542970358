//! Inspection and maintenance operations

use crate::addin::SweepTrigger;
use crate::metrics::EntryMetrics;
use crate::storage::StorageKind;

use super::super::stats::CacheStatsSnapshot;
use super::super::types::{Cache, CacheKey, CacheValue};

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Check for a key without counting an access or triggering a sweep
    pub fn contains(&self, key: &K) -> bool {
        self.inner.storage.lock().peek(key).is_some()
    }

    /// Metrics of one entry, read-only
    pub fn metrics(&self, key: &K) -> Option<EntryMetrics> {
        self.inner
            .storage
            .lock()
            .peek(key)
            .map(|entry| *entry.metrics())
    }

    /// Snapshot of the keys currently stored
    pub fn keys(&self) -> Vec<K> {
        self.inner.storage.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.inner.storage.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force a sweep by every sweeping addin, ignoring their schedules
    pub fn sweep_now(&self) {
        tracing::debug!("manual sweep requested");
        self.inner.sweep_all(SweepTrigger::Manual);
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.inner.stats.snapshot(self.len())
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.inner.storage_kind
    }

    pub fn addin_count(&self) -> usize {
        self.inner.pipeline.len()
    }
}
