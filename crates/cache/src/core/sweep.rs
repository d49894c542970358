//! The handle addins sweep through

use crate::addin::{RemovalReason, SweepTarget};
use crate::entry::CacheEntry;
use std::time::Instant;

use super::types::{CacheInner, CacheKey, CacheValue};

/// Sweep access to one cache on behalf of one addin
pub(super) struct SweepHandle<'a, K, V> {
    inner: &'a CacheInner<K, V>,
    /// The sweeping addin; it is not told about its own evictions
    origin: usize,
}

impl<'a, K, V> SweepHandle<'a, K, V> {
    pub fn new(inner: &'a CacheInner<K, V>, origin: usize) -> Self {
        Self { inner, origin }
    }
}

impl<K, V> SweepTarget<K, V> for SweepHandle<'_, K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    fn keys(&self) -> Vec<K> {
        self.inner.storage.lock().keys()
    }

    fn evict_if(&self, key: &K, decide: &mut dyn FnMut(&CacheEntry<K, V>) -> bool) -> bool {
        let mut storage = self.inner.storage.lock();

        // The key may have gone since the snapshot was taken
        let expired = match storage.peek(key) {
            Some(entry) => decide(entry),
            None => return false,
        };
        if !expired {
            return false;
        }

        match storage.remove(key) {
            Some(entry) => {
                self.inner.stats.record_eviction();
                self.inner
                    .pipeline
                    .removed(&entry, RemovalReason::Expired, Some(self.origin));
                true
            }
            None => false,
        }
    }
}
