//! Factory for creating storage backends

use crate::errors::{CacheError, RecoveryHint, Result};
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::num::NonZeroUsize;

use super::backends::{LruStorage, MemoryStorage};
use super::traits::Storage;

/// Which backend a cache stores its entries in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageKind {
    /// Hash map, optionally with a hard entry limit
    Memory {
        #[serde(default)]
        max_entries: Option<usize>,
    },
    /// Recency-ordered map that drops the least recently used entry when full
    Lru { capacity: usize },
}

impl Default for StorageKind {
    fn default() -> Self {
        Self::Memory { max_entries: None }
    }
}

impl StorageKind {
    /// Build a kind from its name and an optional size limit
    pub fn parse(name: &str, capacity: Option<usize>) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "memory" | "hashtable" => Ok(Self::Memory {
                max_entries: capacity,
            }),
            "lru" => match capacity {
                Some(capacity) => Ok(Self::Lru { capacity }),
                None => Err(CacheError::Configuration {
                    message: "LRU storage requires a capacity".to_string(),
                    recovery_hint: RecoveryHint::UpdateConfiguration,
                }),
            },
            _ => Err(CacheError::Configuration {
                message: format!("Unknown storage backend: {name}"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "memory".to_string(),
                },
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Lru { .. } => "lru",
        }
    }

    /// Reject sizes no backend can honour
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Memory {
                max_entries: Some(0),
            } => Err(CacheError::configuration(
                "memory storage max_entries must be greater than zero",
            )),
            Self::Lru { capacity: 0 } => Err(CacheError::configuration(
                "LRU storage capacity must be greater than zero",
            )),
            _ => Ok(()),
        }
    }
}

/// Storage backend factory
pub fn create_storage<K, V>(kind: &StorageKind) -> Result<Box<dyn Storage<K, V>>>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    kind.validate()?;
    match *kind {
        StorageKind::Memory { max_entries } => Ok(Box::new(MemoryStorage::new(max_entries))),
        StorageKind::Lru { capacity } => {
            let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
                CacheError::configuration("LRU storage capacity must be greater than zero")
            })?;
            Ok(Box::new(LruStorage::new(capacity)))
        }
    }
}
