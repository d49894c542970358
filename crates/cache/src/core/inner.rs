//! Critical-section logic shared by the public operations

use crate::addin::{Flow, RemovalReason, SweepTrigger};
use crate::entry::CacheEntry;
use crate::errors::{CacheError, Result};
use crate::storage::Storage;
use std::sync::Arc;

use super::sweep::SweepHandle;
use super::types::{CacheInner, CacheKey, CacheValue};

impl<K, V> CacheInner<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Read an entry as a caller access: hooks, metrics, clone
    ///
    /// Must be called with the storage lock held.
    pub(super) fn lookup(&self, storage: &mut dyn Storage<K, V>, key: &K) -> Option<V> {
        if self.pipeline.before_get(key) == Flow::Reject {
            return None;
        }

        let now = self.clock.now();
        let entry = storage.get(key)?;
        entry.record_access(now);

        if self.pipeline.after_get(entry) == Flow::Reject {
            return None;
        }
        Some(entry.value().clone())
    }

    /// Store a value with fresh metrics
    ///
    /// With `replace` an existing entry for the key is overwritten,
    /// otherwise the key must be absent. Returns false when an addin
    /// vetoed the store. Must be called with the storage lock held.
    pub(super) fn store(
        &self,
        storage: &mut dyn Storage<K, V>,
        key: K,
        value: V,
        replace: bool,
    ) -> Result<bool> {
        if self.pipeline.before_add(&key, &value) == Flow::Reject {
            self.stats.record_rejected_write();
            tracing::debug!(key = ?key, "store vetoed by addin");
            return Ok(false);
        }

        let previous = if replace { storage.remove(&key) } else { None };
        let entry = CacheEntry::new(key.clone(), value, self.clock.now());

        let displaced = match storage.add(key.clone(), entry) {
            Ok(displaced) => displaced,
            Err(e) => {
                // Put back what we took out so a failed set changes nothing
                if let Some(previous) = previous {
                    if let Err(restore) = storage.add(key.clone(), previous) {
                        tracing::warn!(key = ?key, error = %restore, "failed to restore replaced entry");
                    }
                }
                tracing::debug!(key = ?key, error = %e, "storage rejected entry");
                return Err(e);
            }
        };

        if let Some(previous) = previous {
            self.pipeline
                .removed(&previous, RemovalReason::Replaced, None);
        }
        if let Some(displaced) = displaced {
            if displaced.key() == &key {
                self.pipeline
                    .removed(&displaced, RemovalReason::Replaced, None);
            } else {
                self.stats.record_eviction();
                tracing::trace!(key = ?displaced.key(), "entry displaced by storage backend");
                self.pipeline
                    .removed(&displaced, RemovalReason::Capacity, None);
            }
        }
        if let Some(entry) = storage.peek(&key) {
            // the entry is already stored; an after-add veto has nothing to undo
            let _ = self.pipeline.after_add(entry);
        }

        self.stats.record_write();
        Ok(true)
    }

    /// Return the cached value or build it once among racing callers
    ///
    /// The caller that fills the slot also stores the value, so a backend
    /// error reaches every caller that waited on the same build.
    pub(super) fn get_or_add<E, F>(&self, key: K, factory: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: From<CacheError>,
    {
        if let Some(value) = self.lookup(&mut **self.storage.lock(), &key) {
            self.stats.record_hit();
            return Ok(value);
        }
        self.stats.record_miss();

        let slot = Arc::clone(self.in_flight.entry(key.clone()).or_default().value());
        let mut initialized = false;
        let mut refused = None;

        let outcome = slot.get_or_try_init(|| -> std::result::Result<_, E> {
            initialized = true;
            // A racing caller may have stored the value between our miss
            // and taking the slot
            if let Some(value) = self.lookup(&mut **self.storage.lock(), &key) {
                return Ok(Ok(value));
            }
            let value = factory()?;
            Ok(match self.publish(&key, &value) {
                Ok(()) => Ok(value),
                Err(e) => {
                    let shared = e.duplicate();
                    refused = Some(e);
                    Err(shared)
                }
            })
        });

        if initialized {
            // Published (or refused) before the slot goes, so late callers hit storage
            self.in_flight
                .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot));
        }

        match outcome? {
            Ok(value) => Ok(value.clone()),
            Err(shared) => Err(E::from(refused.unwrap_or_else(|| shared.duplicate()))),
        }
    }

    /// Store a freshly built value unless the key was filled meanwhile
    fn publish(&self, key: &K, value: &V) -> Result<()> {
        let mut storage = self.storage.lock();
        if storage.peek(key).is_none() {
            self.store(&mut **storage, key.clone(), value.clone(), false)?;
        }
        Ok(())
    }

    pub(super) fn remove(&self, key: &K) -> bool {
        let mut storage = self.storage.lock();
        match storage.remove(key) {
            Some(entry) => {
                self.stats.record_removal();
                self.pipeline
                    .removed(&entry, RemovalReason::Explicit, None);
                true
            }
            None => false,
        }
    }

    /// Run one addin's sweep hook against this cache
    pub(super) fn run_sweep(&self, index: usize, trigger: SweepTrigger) -> Flow {
        let target = SweepHandle::new(self, index);
        self.pipeline.sweep_one(index, &target, trigger)
    }

    /// Run every sweeping addin in order
    pub(super) fn sweep_all(&self, trigger: SweepTrigger) {
        for index in self.pipeline.sweepers() {
            if self.run_sweep(index, trigger) != Flow::Continue {
                break;
            }
        }
    }
}
