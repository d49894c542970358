//! Core storage backend trait definition

use crate::entry::CacheEntry;
use crate::errors::Result;

/// Key to entry mapping used by the cache
pub trait Storage<K, V>: Send {
    /// Insert an entry for a key that is not present
    ///
    /// Returns an entry the backend dropped to make room, if any.
    fn add(&mut self, key: K, entry: CacheEntry<K, V>) -> Result<Option<CacheEntry<K, V>>>;

    /// Look up an entry as part of a caller access
    fn get(&mut self, key: &K) -> Option<&mut CacheEntry<K, V>>;

    /// Look up an entry without counting it as an access
    fn peek(&self, key: &K) -> Option<&CacheEntry<K, V>>;

    /// Remove an entry, handing it back
    fn remove(&mut self, key: &K) -> Option<CacheEntry<K, V>>;

    /// Replace the value of an existing entry, keeping its metrics
    fn try_update(&mut self, key: &K, value: V) -> bool;

    /// Snapshot of the current keys
    fn keys(&self) -> Vec<K>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, handing them back
    fn clear(&mut self) -> Vec<CacheEntry<K, V>>;
}
