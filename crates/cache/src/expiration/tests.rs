//! Tests for the expiration addin and its strategy

use super::*;
use crate::addin::{CacheAddin, SweepTarget, SweepTrigger};
use crate::entry::CacheEntry;
use crate::errors::CacheError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// An in-memory sweep target with a settable clock
struct FakeTarget {
    now: Mutex<Instant>,
    entries: Mutex<BTreeMap<String, CacheEntry<String, u32>>>,
}

impl FakeTarget {
    fn new(keys: &[(&str, u32)]) -> Self {
        let now = Instant::now();
        let entries = keys
            .iter()
            .map(|(k, v)| (k.to_string(), CacheEntry::new(k.to_string(), *v, now)))
            .collect();
        Self {
            now: Mutex::new(now),
            entries: Mutex::new(entries),
        }
    }

    fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl SweepTarget<String, u32> for FakeTarget {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    fn evict_if(
        &self,
        key: &String,
        decide: &mut dyn FnMut(&CacheEntry<String, u32>) -> bool,
    ) -> bool {
        let mut entries = self.entries.lock();
        let expired = entries.get(key).map(|entry| decide(entry)).unwrap_or(false);
        expired && entries.remove(key).is_some()
    }
}

fn evict_all(strategy: ExpirationCheckStrategy) -> ExpirationAddin<String, u32> {
    ExpirationAddin::new(strategy, |_: &u32, _| true).unwrap()
}

#[test]
fn test_on_every_action_sweeps_on_actions_only() {
    let addin = evict_all(ExpirationCheckStrategy::on_every_action());
    let target = FakeTarget::new(&[("a", 1)]);

    assert_eq!(addin.sweep_interval(), None);

    addin.on_sweep(&target, SweepTrigger::Timer);
    assert!(target.contains("a"));

    addin.on_sweep(&target, SweepTrigger::Action);
    assert!(!target.contains("a"));
    assert_eq!(addin.stats().sweeps, 1);
    assert_eq!(addin.stats().evictions, 1);
}

#[test]
fn test_periodic_sweeps_on_timer_only() {
    let addin = evict_all(ExpirationCheckStrategy::periodic(Duration::from_millis(100)));
    let target = FakeTarget::new(&[("a", 1)]);

    assert_eq!(addin.sweep_interval(), Some(Duration::from_millis(100)));

    addin.on_sweep(&target, SweepTrigger::Action);
    assert!(target.contains("a"));
    assert_eq!(addin.stats().skipped, 0);

    addin.on_sweep(&target, SweepTrigger::Timer);
    assert!(!target.contains("a"));
}

#[test]
fn test_check_in_period_spaces_out_sweeps() {
    let strategy = ExpirationCheckStrategy::on_every_action()
        .with_check_in_period(Duration::from_millis(500));
    let addin = evict_all(strategy);
    let target = FakeTarget::new(&[]);

    for _ in 0..10 {
        addin.on_sweep(&target, SweepTrigger::Action);
        target.advance(Duration::from_millis(20));
    }
    assert_eq!(addin.stats().sweeps, 1);
    assert_eq!(addin.stats().skipped, 9);

    target.advance(Duration::from_millis(500));
    addin.on_sweep(&target, SweepTrigger::Action);
    assert_eq!(addin.stats().sweeps, 2);
}

#[test]
fn test_manual_sweep_ignores_schedule() {
    let strategy = ExpirationCheckStrategy::periodic(Duration::from_secs(60));
    let addin = evict_all(strategy);
    let target = FakeTarget::new(&[("a", 1)]);

    addin.on_sweep(&target, SweepTrigger::Timer);
    target.entries.lock().insert(
        "b".to_string(),
        CacheEntry::new("b".to_string(), 2, target.now()),
    );

    // inside the spacing window, yet manual still sweeps
    addin.on_sweep(&target, SweepTrigger::Manual);
    assert!(!target.contains("b"));
    assert_eq!(addin.stats().sweeps, 2);

    // and it counts as the latest sweep for the next timer tick
    addin.on_sweep(&target, SweepTrigger::Timer);
    assert_eq!(addin.stats().skipped, 1);
}

#[test]
fn test_time_check_selects_elapsed_reading() {
    let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
    let record = std::sync::Arc::clone(&seen);
    let strategy = ExpirationCheckStrategy::on_every_action()
        .with_time_check(TimeCheckStrategy::ByLastAccess);
    let addin: ExpirationAddin<String, u32> = ExpirationAddin::new(strategy, move |_, metrics| {
        record.lock().push((metrics.elapsed(), metrics.age()));
        false
    })
    .unwrap();

    let target = FakeTarget::new(&[("a", 1)]);
    target.advance(Duration::from_secs(3));
    let touched = target.now();
    if let Some(entry) = target.entries.lock().get_mut("a") {
        entry.record_access(touched);
    }
    target.advance(Duration::from_secs(2));

    addin.on_sweep(&target, SweepTrigger::Manual);
    assert_eq!(
        *seen.lock(),
        vec![(Duration::from_secs(2), Duration::from_secs(5))]
    );
}

#[test]
fn test_predicate_failure_isolated_to_entry() {
    let addin: ExpirationAddin<String, u32> = ExpirationAddin::fallible(
        ExpirationCheckStrategy::on_every_action(),
        |value, _| {
            if *value == 0 {
                Err("broken".into())
            } else {
                Ok(true)
            }
        },
    )
    .unwrap();
    let target = FakeTarget::new(&[("a", 1), ("b", 0), ("c", 3)]);

    addin.on_sweep(&target, SweepTrigger::Action);

    assert!(!target.contains("a"));
    assert!(target.contains("b"));
    assert!(!target.contains("c"));
    let stats = addin.stats();
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.predicate_failures, 1);
}

#[test]
fn test_predicate_panic_counts_as_failure() {
    let addin: ExpirationAddin<String, u32> =
        ExpirationAddin::new(ExpirationCheckStrategy::on_every_action(), |value: &u32, _| {
            if *value == 0 {
                panic!("corrupt entry");
            }
            true
        })
        .unwrap();
    let target = FakeTarget::new(&[("a", 1), ("b", 0), ("c", 3)]);

    addin.on_sweep(&target, SweepTrigger::Action);

    assert!(!target.contains("a"));
    assert!(target.contains("b"));
    assert!(!target.contains("c"));
    let stats = addin.stats();
    assert_eq!(stats.sweeps, 1);
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.predicate_failures, 1);
}

#[test]
fn test_periodic_zero_period_is_rejected() {
    let strategy = ExpirationCheckStrategy::periodic(Duration::ZERO);
    let result = ExpirationAddin::<String, u32>::new(strategy, |_, _| true);
    assert!(matches!(result, Err(CacheError::Configuration { .. })));
}

#[test]
fn test_strategy_parsing() {
    assert_eq!(
        "by-last-access".parse::<TimeCheckStrategy>().unwrap(),
        TimeCheckStrategy::ByLastAccess
    );
    assert_eq!(
        "Periodic".parse::<CheckStrategy>().unwrap(),
        CheckStrategy::Periodic
    );
    assert!("hourly".parse::<CheckStrategy>().is_err());
}

#[test]
fn test_strategy_json_uses_milliseconds() {
    let strategy: ExpirationCheckStrategy = serde_json::from_str(
        r#"{"time_check":"by_last_access","check":"periodic","check_period_ms":250}"#,
    )
    .unwrap();

    assert_eq!(strategy.time_check, TimeCheckStrategy::ByLastAccess);
    assert_eq!(strategy.check, CheckStrategy::Periodic);
    assert_eq!(strategy.check_period, Duration::from_millis(250));
    assert_eq!(strategy.check_in_period, Duration::ZERO);

    let defaults: ExpirationCheckStrategy = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, ExpirationCheckStrategy::on_every_action());

    let json = serde_json::to_value(ExpirationCheckStrategy::periodic(Duration::from_secs(2)))
        .unwrap();
    assert_eq!(json["check_in_period_ms"], 2000);
}
