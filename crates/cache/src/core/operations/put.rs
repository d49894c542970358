//! Cache put operations

use crate::addin::{Flow, SweepTrigger};
use crate::errors::Result;

use super::super::types::{Cache, CacheKey, CacheValue};

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Insert or replace the value for a key, resetting its metrics
    ///
    /// Returns `Ok(false)` if an addin vetoed the store. A backend error
    /// leaves the previous entry, if any, in place.
    pub fn set(&self, key: K, value: V) -> Result<bool> {
        let stored = {
            let mut storage = self.inner.storage.lock();
            self.inner.store(&mut **storage, key, value, true)
        };

        self.inner.sweep_all(SweepTrigger::Action);
        stored
    }

    /// Replace the value of an existing entry, keeping its metrics
    ///
    /// Returns false if the key is absent or an addin vetoed the update.
    pub fn try_update(&self, key: &K, value: V) -> bool {
        let updated = {
            let mut storage = self.inner.storage.lock();
            if storage.peek(key).is_none()
                || self.inner.pipeline.before_add(key, &value) == Flow::Reject
            {
                false
            } else {
                storage.try_update(key, value)
            }
        };

        if updated {
            self.inner.stats.record_write();
        }
        self.inner.sweep_all(SweepTrigger::Action);
        updated
    }
}
