//! Cache builder and initialization

use crate::addin::{AddinPipeline, CacheAddin};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheSettings;
use crate::errors::Result;
use crate::storage::{create_storage, MemoryStorage, StorageKind};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use super::stats::CacheStats;
use super::timer::SweepTimer;
use super::types::{Cache, CacheInner, CacheKey, CacheValue};

/// Collects construction options for a [`Cache`]
pub struct CacheBuilder<K, V> {
    storage: StorageKind,
    pipeline: AddinPipeline<K, V>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    pub fn new() -> Self {
        Self {
            storage: StorageKind::default(),
            pipeline: AddinPipeline::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Pick the storage backend
    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.storage = kind;
        self
    }

    /// Apply the storage section of loaded settings
    ///
    /// The expiration section needs a predicate, so it is turned into an
    /// addin with [`ExpirationAddin::from_settings`](crate::ExpirationAddin::from_settings).
    pub fn settings(mut self, settings: &CacheSettings) -> Self {
        self.storage = settings.storage;
        self
    }

    /// Attach an addin after the ones already attached
    pub fn addin(mut self, addin: Arc<dyn CacheAddin<K, V>>) -> Self {
        self.pipeline.attach(addin);
        self
    }

    /// Use a different time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create the cache and start any timers its addins asked for
    pub fn build(self) -> Result<Cache<K, V>> {
        let storage = create_storage(&self.storage)?;
        let timer_requests = self.pipeline.timer_requests();

        let inner = Arc::new(CacheInner {
            storage: Mutex::new(storage),
            storage_kind: self.storage,
            pipeline: self.pipeline,
            clock: self.clock,
            in_flight: DashMap::new(),
            stats: CacheStats::default(),
            timers: Mutex::new(Vec::with_capacity(timer_requests.len())),
        });

        // On failure `inner` drops here, stopping the timers already started
        for (index, period) in timer_requests {
            let timer = SweepTimer::start(&inner, index, period)?;
            inner.timers.lock().push(timer);
        }

        tracing::debug!(
            storage = inner.storage_kind.name(),
            addins = inner.pipeline.len(),
            timers = inner.timers.lock().len(),
            "cache created"
        );

        Ok(Cache { inner })
    }
}

impl<K, V> Default for CacheBuilder<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    /// Unbounded in-memory cache with no addins
    pub fn new() -> Self {
        let kind = StorageKind::default();
        Self {
            inner: Arc::new(CacheInner {
                storage: Mutex::new(Box::new(MemoryStorage::default())),
                storage_kind: kind,
                pipeline: AddinPipeline::new(),
                clock: Arc::new(SystemClock),
                in_flight: DashMap::new(),
                stats: CacheStats::default(),
                timers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    /// Cache with the backend described by `settings` and no addins
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        settings.validate()?;
        CacheBuilder::new().settings(settings).build()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: CacheKey,
    V: CacheValue,
{
    fn default() -> Self {
        Self::new()
    }
}
