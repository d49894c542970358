//! Core addin trait definition

use crate::entry::CacheEntry;
use std::time::{Duration, Instant};

/// The points in a cache action where addins are called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeAdd,
    AfterAdd,
    BeforeGet,
    AfterGet,
    Remove,
    Sweep,
}

impl Hook {
    pub const ALL: [Hook; 6] = [
        Hook::BeforeAdd,
        Hook::AfterAdd,
        Hook::BeforeGet,
        Hook::AfterGet,
        Hook::Remove,
        Hook::Sweep,
    ];
}

/// What a hook wants the pipeline to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Call the next addin
    #[default]
    Continue,
    /// Skip the remaining addins, let the action proceed
    Stop,
    /// Veto the action and skip the remaining addins
    Reject,
}

/// Why an entry left the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// A caller removed it
    Explicit,
    /// A `set` overwrote it
    Replaced,
    /// An addin evicted it during a sweep
    Expired,
    /// The storage backend dropped it to make room
    Capacity,
    /// The whole cache was cleared
    Cleared,
}

/// What started a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    /// A cache operation just completed
    Action,
    /// A background timer fired
    Timer,
    /// `sweep_now` was called
    Manual,
}

/// The view of the cache an addin gets while sweeping
///
/// Every call takes its own short critical section, so a sweep never
/// blocks other callers for longer than one entry.
pub trait SweepTarget<K, V> {
    /// Current time on the cache's clock
    fn now(&self) -> Instant;

    /// Snapshot of the keys present when called
    fn keys(&self) -> Vec<K>;

    /// Remove `key` if `decide` returns true for its entry
    ///
    /// Other addins are told about the removal with
    /// [`RemovalReason::Expired`]. Returns whether the entry was removed.
    fn evict_if(&self, key: &K, decide: &mut dyn FnMut(&CacheEntry<K, V>) -> bool) -> bool;
}

/// A policy object attached to a cache
pub trait CacheAddin<K, V>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// The hooks this addin wants to be called for
    fn hooks(&self) -> &'static [Hook];

    /// If set, the cache runs a background timer calling
    /// [`on_sweep`](Self::on_sweep) with [`SweepTrigger::Timer`] at this period
    fn sweep_interval(&self) -> Option<Duration> {
        None
    }

    fn on_before_add(&self, _key: &K, _value: &V) -> Flow {
        Flow::Continue
    }

    fn on_after_add(&self, _entry: &CacheEntry<K, V>) -> Flow {
        Flow::Continue
    }

    fn on_before_get(&self, _key: &K) -> Flow {
        Flow::Continue
    }

    fn on_after_get(&self, _entry: &CacheEntry<K, V>) -> Flow {
        Flow::Continue
    }

    fn on_remove(&self, _entry: &CacheEntry<K, V>, _reason: RemovalReason) -> Flow {
        Flow::Continue
    }

    /// Called outside the critical section after every action, on timer
    /// ticks and on manual sweeps
    fn on_sweep(&self, _target: &dyn SweepTarget<K, V>, _trigger: SweepTrigger) -> Flow {
        Flow::Continue
    }
}
