//! Hash map storage backend

use crate::entry::CacheEntry;
use crate::errors::{CacheError, RecoveryHint, Result};
use crate::storage::traits::Storage;
use std::collections::HashMap;
use std::hash::Hash;

/// Plain in-memory map
///
/// With `max_entries` set, inserting a new key into a full map fails
/// instead of dropping anything.
pub struct MemoryStorage<K, V> {
    entries: HashMap<K, CacheEntry<K, V>>,
    max_entries: Option<usize>,
}

impl<K, V> MemoryStorage<K, V>
where
    K: Eq + Hash,
{
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }
}

impl<K, V> Default for MemoryStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(None)
    }
}

impl<K, V> Storage<K, V> for MemoryStorage<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
    fn add(&mut self, key: K, entry: CacheEntry<K, V>) -> Result<Option<CacheEntry<K, V>>> {
        if let Some(limit) = self.max_entries {
            if self.entries.len() >= limit && !self.entries.contains_key(&key) {
                return Err(CacheError::CapacityExceeded {
                    capacity: limit,
                    recovery_hint: RecoveryHint::IncreaseCapacity {
                        suggested_entries: limit.saturating_mul(2),
                    },
                });
            }
        }

        Ok(self.entries.insert(key, entry))
    }

    fn get(&mut self, key: &K) -> Option<&mut CacheEntry<K, V>> {
        self.entries.get_mut(key)
    }

    fn peek(&self, key: &K) -> Option<&CacheEntry<K, V>> {
        self.entries.get(key)
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<K, V>> {
        self.entries.remove(key)
    }

    fn try_update(&mut self, key: &K, value: V) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.replace_value(value);
                true
            }
            None => false,
        }
    }

    fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) -> Vec<CacheEntry<K, V>> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }
}
