//! Per-entry bookkeeping used to drive eviction decisions

use crate::expiration::TimeCheckStrategy;
use std::time::{Duration, Instant};

/// Creation time, last access time and access count of one cache entry
///
/// Mutated only by the cache while it holds the entry's critical section.
/// Addins and predicates see it read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetrics {
    created_at: Instant,
    last_accessed_at: Instant,
    access_count: u64,
}

impl EntryMetrics {
    pub fn new(now: Instant) -> Self {
        Self {
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    /// Record a read of the entry
    pub(crate) fn record_access(&mut self, now: Instant) {
        // never let the access time run behind a previous reading
        self.last_accessed_at = self.last_accessed_at.max(now);
        self.access_count = self.access_count.saturating_add(1);
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Time since the entry was inserted
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Time since the entry was last read (or inserted, if never read)
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed_at)
    }
}

/// What an expiration predicate sees for one entry
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    metrics: EntryMetrics,
    now: Instant,
    time_check: TimeCheckStrategy,
}

impl MetricsSnapshot {
    pub fn new(metrics: EntryMetrics, now: Instant, time_check: TimeCheckStrategy) -> Self {
        Self {
            metrics,
            now,
            time_check,
        }
    }

    pub fn metrics(&self) -> &EntryMetrics {
        &self.metrics
    }

    /// The instant the sweep evaluating this entry started
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn time_check(&self) -> TimeCheckStrategy {
        self.time_check
    }

    /// Age or idle time, depending on the configured time check strategy
    pub fn elapsed(&self) -> Duration {
        match self.time_check {
            TimeCheckStrategy::ByAddDate => self.age(),
            TimeCheckStrategy::ByLastAccess => self.idle(),
        }
    }

    pub fn age(&self) -> Duration {
        self.metrics.age(self.now)
    }

    pub fn idle(&self) -> Duration {
        self.metrics.idle(self.now)
    }

    pub fn access_count(&self) -> u64 {
        self.metrics.access_count
    }
}
