//! Recency-ordered storage backend

use crate::entry::CacheEntry;
use crate::errors::Result;
use crate::storage::traits::Storage;
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Bounded map that drops its least recently used entry when full
pub struct LruStorage<K, V>
where
    K: Eq + Hash,
{
    entries: LruCache<K, CacheEntry<K, V>>,
}

impl<K, V> LruStorage<K, V>
where
    K: Eq + Hash,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl<K, V> Storage<K, V> for LruStorage<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
    fn add(&mut self, key: K, entry: CacheEntry<K, V>) -> Result<Option<CacheEntry<K, V>>> {
        Ok(self.entries.push(key, entry).map(|(_, displaced)| displaced))
    }

    fn get(&mut self, key: &K) -> Option<&mut CacheEntry<K, V>> {
        self.entries.get_mut(key)
    }

    fn peek(&self, key: &K) -> Option<&CacheEntry<K, V>> {
        self.entries.peek(key)
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<K, V>> {
        self.entries.pop(key)
    }

    fn try_update(&mut self, key: &K, value: V) -> bool {
        match self.entries.peek_mut(key) {
            Some(entry) => {
                entry.replace_value(value);
                true
            }
            None => false,
        }
    }

    /// Keys from most to least recently used
    fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) -> Vec<CacheEntry<K, V>> {
        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some((_, entry)) = self.entries.pop_lru() {
            drained.push(entry);
        }
        drained
    }
}
