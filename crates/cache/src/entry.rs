//! Cache entries as held by a storage backend

use crate::metrics::EntryMetrics;
use std::time::Instant;

/// One stored value with its key and bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    key: K,
    value: V,
    metrics: EntryMetrics,
}

impl<K, V> CacheEntry<K, V> {
    pub fn new(key: K, value: V, now: Instant) -> Self {
        Self {
            key,
            value,
            metrics: EntryMetrics::new(now),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn metrics(&self) -> &EntryMetrics {
        &self.metrics
    }

    pub(crate) fn record_access(&mut self, now: Instant) {
        self.metrics.record_access(now);
    }

    /// Swap the value in place, keeping the metrics
    pub(crate) fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_value(self) -> V {
        self.value
    }
}
