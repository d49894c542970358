//! The expiration addin

use crate::addin::{panic_message, CacheAddin, Flow, Hook, SweepTarget, SweepTrigger};
use crate::config::CacheSettings;
use crate::entry::CacheEntry;
use crate::errors::Result;
use crate::metrics::MetricsSnapshot;
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::strategy::{CheckStrategy, ExpirationCheckStrategy};

/// A predicate could not decide about one entry
///
/// The entry stays cached and is looked at again on the next sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expiration predicate failed: {}", self.message)
    }
}

impl std::error::Error for PredicateError {}

impl From<String> for PredicateError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for PredicateError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

type Predicate<V> =
    dyn Fn(&V, &MetricsSnapshot) -> std::result::Result<bool, PredicateError> + Send + Sync;

/// Counters describing what the addin has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpirationStats {
    /// Full passes over the cache
    pub sweeps: u64,
    /// Triggers dropped because the previous sweep was too recent
    pub skipped: u64,
    /// Entries removed because their predicate returned true
    pub evictions: u64,
    /// Entries whose predicate returned an error
    pub predicate_failures: u64,
}

#[derive(Default)]
struct Counters {
    sweeps: AtomicU64,
    skipped: AtomicU64,
    evictions: AtomicU64,
    predicate_failures: AtomicU64,
}

/// Evicts entries whose predicate evaluates to true
pub struct ExpirationAddin<K, V> {
    name: String,
    strategy: ExpirationCheckStrategy,
    predicate: Box<Predicate<V>>,
    /// When the last sweep started
    last_sweep: Mutex<Option<Instant>>,
    counters: Counters,
    _key: PhantomData<fn(&K)>,
}

impl<K, V> ExpirationAddin<K, V> {
    /// Create an addin with a predicate that always decides
    pub fn new<P>(strategy: ExpirationCheckStrategy, predicate: P) -> Result<Self>
    where
        P: Fn(&V, &MetricsSnapshot) -> bool + Send + Sync + 'static,
    {
        Self::fallible(strategy, move |value, metrics| Ok(predicate(value, metrics)))
    }

    /// Create an addin with a predicate that may fail for some entries
    pub fn fallible<P>(strategy: ExpirationCheckStrategy, predicate: P) -> Result<Self>
    where
        P: Fn(&V, &MetricsSnapshot) -> std::result::Result<bool, PredicateError>
            + Send
            + Sync
            + 'static,
    {
        strategy.validate()?;
        Ok(Self {
            name: "expiration".to_string(),
            strategy,
            predicate: Box::new(predicate),
            last_sweep: Mutex::new(None),
            counters: Counters::default(),
            _key: PhantomData,
        })
    }

    /// Create an addin on the schedule loaded into `settings`
    ///
    /// Returns `None` when the settings carry no expiration section.
    pub fn from_settings<P>(settings: &CacheSettings, predicate: P) -> Result<Option<Self>>
    where
        P: Fn(&V, &MetricsSnapshot) -> bool + Send + Sync + 'static,
    {
        settings
            .expiration
            .map(|strategy| Self::new(strategy, predicate))
            .transpose()
    }

    /// Rename the addin in logs
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn strategy(&self) -> &ExpirationCheckStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> ExpirationStats {
        ExpirationStats {
            sweeps: self.counters.sweeps.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            predicate_failures: self.counters.predicate_failures.load(Ordering::Relaxed),
        }
    }

    /// Decide whether a trigger turns into a sweep, and record it if so
    fn claim(&self, trigger: SweepTrigger, now: Instant) -> bool {
        let wanted = match (trigger, self.strategy.check) {
            (SweepTrigger::Manual, _) => true,
            (SweepTrigger::Action, CheckStrategy::OnEveryAction)
            | (SweepTrigger::Timer, CheckStrategy::Periodic) => true,
            _ => false,
        };
        if !wanted {
            return false;
        }

        let mut last = self.last_sweep.lock();
        if trigger != SweepTrigger::Manual {
            if let Some(previous) = *last {
                let since = now.saturating_duration_since(previous);
                if since < self.strategy.check_in_period {
                    self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(
                        addin = %self.name,
                        ?trigger,
                        since_ms = since.as_millis() as u64,
                        "sweep debounced"
                    );
                    return false;
                }
            }
        }
        *last = Some(now);
        true
    }
}

impl<K, V> ExpirationAddin<K, V>
where
    K: fmt::Debug,
{
    /// Evaluate every entry present at the start and evict the expired ones
    fn sweep(&self, target: &dyn SweepTarget<K, V>) {
        let now = target.now();
        let keys = target.keys();
        let mut evicted = 0u64;
        let mut failed = 0u64;

        for key in &keys {
            let mut failure = None;
            let removed = target.evict_if(key, &mut |entry: &CacheEntry<K, V>| {
                let snapshot = MetricsSnapshot::new(*entry.metrics(), now, self.strategy.time_check);
                let verdict =
                    panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(entry.value(), &snapshot)))
                        .unwrap_or_else(|payload| {
                            Err(PredicateError::new(format!(
                                "predicate panicked: {}",
                                panic_message(payload.as_ref())
                            )))
                        });
                match verdict {
                    Ok(expired) => expired,
                    Err(e) => {
                        failure = Some(e);
                        false
                    }
                }
            });

            if let Some(e) = failure {
                failed += 1;
                tracing::warn!(addin = %self.name, key = ?key, error = %e, "keeping entry whose expiration check failed");
            } else if removed {
                evicted += 1;
                tracing::trace!(addin = %self.name, key = ?key, "entry expired");
            }
        }

        self.counters.sweeps.fetch_add(1, Ordering::Relaxed);
        self.counters.evictions.fetch_add(evicted, Ordering::Relaxed);
        self.counters
            .predicate_failures
            .fetch_add(failed, Ordering::Relaxed);

        if evicted > 0 || failed > 0 {
            tracing::debug!(
                addin = %self.name,
                scanned = keys.len(),
                evicted,
                failed,
                "expiration sweep finished"
            );
        }
    }
}

impl<K, V> CacheAddin<K, V> for ExpirationAddin<K, V>
where
    K: fmt::Debug,
    V: Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn hooks(&self) -> &'static [Hook] {
        &[Hook::Sweep]
    }

    fn sweep_interval(&self) -> Option<Duration> {
        match self.strategy.check {
            CheckStrategy::Periodic => Some(self.strategy.check_period),
            CheckStrategy::OnEveryAction => None,
        }
    }

    fn on_sweep(&self, target: &dyn SweepTarget<K, V>, trigger: SweepTrigger) -> Flow {
        if self.claim(trigger, target.now()) {
            self.sweep(target);
        }
        Flow::Continue
    }
}
