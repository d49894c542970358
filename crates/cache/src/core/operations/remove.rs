//! Cache remove operations

use crate::addin::SweepTrigger;

use super::super::types::{Cache, CacheKey, CacheValue};

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Remove an entry from the cache
    ///
    /// Returns whether an entry was present. Removing an absent key is not
    /// an error.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.inner.remove(key);
        self.inner.sweep_all(SweepTrigger::Action);
        removed
    }

    /// Remove every entry
    pub fn clear(&self) -> usize {
        let mut storage = self.inner.storage.lock();
        let drained = storage.clear();
        for entry in &drained {
            self.inner.stats.record_removal();
            self.inner
                .pipeline
                .removed(entry, crate::addin::RemovalReason::Cleared, None);
        }
        drained.len()
    }
}
