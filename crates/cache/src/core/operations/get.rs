//! Cache get operations

use crate::addin::SweepTrigger;
use crate::errors::{CacheError, Result};

use super::super::types::{Cache, CacheKey, CacheValue};

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Get the value for a key, counting it as an access
    ///
    /// Expiration addins running on every action sweep after the lookup, so
    /// the value returned may be evicted by the time this returns.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = {
            let mut storage = self.inner.storage.lock();
            self.inner.lookup(&mut **storage, key)
        };

        if value.is_some() {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }

        self.inner.sweep_all(SweepTrigger::Action);
        value
    }

    /// Get the value for a key, building and storing it if absent
    ///
    /// Among callers racing on the same key the factory runs once and all
    /// of them receive its value. Callers on other keys are never blocked
    /// by the factory.
    pub fn get_or_add<F>(&self, key: K, factory: F) -> Result<V>
    where
        F: FnOnce() -> V,
    {
        self.try_get_or_add(key, || Ok::<V, CacheError>(factory()))
    }

    /// Like [`get_or_add`](Self::get_or_add) with a factory that may fail
    ///
    /// A factory error is returned as is and nothing is cached; the next
    /// caller for the key runs its own factory.
    pub fn try_get_or_add<E, F>(&self, key: K, factory: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: From<CacheError>,
    {
        let result = self.inner.get_or_add(key, factory);
        self.inner.sweep_all(SweepTrigger::Action);
        result
    }
}
