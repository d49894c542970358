//! Tests for the addin pipeline

use super::*;
use crate::entry::CacheEntry;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Records every hook call into a shared log
struct Recorder {
    name: &'static str,
    hooks: &'static [Hook],
    log: Arc<Mutex<Vec<String>>>,
    before_add: Flow,
}

impl Recorder {
    fn new(name: &'static str, hooks: &'static [Hook], log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            hooks,
            log: Arc::clone(log),
            before_add: Flow::Continue,
        }
    }

    fn answering(mut self, flow: Flow) -> Self {
        self.before_add = flow;
        self
    }
}

impl CacheAddin<String, i32> for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn hooks(&self) -> &'static [Hook] {
        self.hooks
    }

    fn on_before_add(&self, key: &String, _value: &i32) -> Flow {
        self.log.lock().push(format!("{}:before_add:{key}", self.name));
        self.before_add
    }

    fn on_after_get(&self, entry: &CacheEntry<String, i32>) -> Flow {
        self.log
            .lock()
            .push(format!("{}:after_get:{}", self.name, entry.key()));
        Flow::Continue
    }

    fn on_remove(&self, entry: &CacheEntry<String, i32>, reason: RemovalReason) -> Flow {
        self.log
            .lock()
            .push(format!("{}:remove:{}:{reason:?}", self.name, entry.key()));
        Flow::Continue
    }
}

fn entry(key: &str) -> CacheEntry<String, i32> {
    CacheEntry::new(key.to_string(), 1, Instant::now())
}

#[test]
fn test_dispatch_follows_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::new(Recorder::new("first", &[Hook::BeforeAdd], &log)));
    pipeline.attach(Arc::new(Recorder::new("second", &[Hook::BeforeAdd], &log)));

    assert_eq!(pipeline.before_add(&"k".to_string(), &1), Flow::Continue);
    assert_eq!(
        *log.lock(),
        vec!["first:before_add:k".to_string(), "second:before_add:k".to_string()]
    );
}

#[test]
fn test_reject_vetoes_and_short_circuits() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::new(
        Recorder::new("veto", &[Hook::BeforeAdd], &log).answering(Flow::Reject),
    ));
    pipeline.attach(Arc::new(Recorder::new("late", &[Hook::BeforeAdd], &log)));

    assert_eq!(pipeline.before_add(&"k".to_string(), &1), Flow::Reject);
    assert_eq!(*log.lock(), vec!["veto:before_add:k".to_string()]);
}

#[test]
fn test_stop_skips_rest_without_veto() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::new(
        Recorder::new("stopper", &[Hook::BeforeAdd], &log).answering(Flow::Stop),
    ));
    pipeline.attach(Arc::new(Recorder::new("late", &[Hook::BeforeAdd], &log)));

    assert_eq!(pipeline.before_add(&"k".to_string(), &1), Flow::Continue);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_undeclared_hooks_are_not_called() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::new(Recorder::new("adds-only", &[Hook::BeforeAdd], &log)));

    pipeline.after_get(&entry("k"));
    pipeline.removed(&entry("k"), RemovalReason::Explicit, None);

    assert!(log.lock().is_empty());
    assert!(!pipeline.handles(Hook::Remove));
    assert!(pipeline.handles(Hook::BeforeAdd));
}

#[test]
fn test_removal_skips_originating_addin() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::new(Recorder::new("sweeper", &[Hook::Remove], &log)));
    pipeline.attach(Arc::new(Recorder::new("counter", &[Hook::Remove], &log)));

    pipeline.removed(&entry("k"), RemovalReason::Expired, Some(0));

    assert_eq!(*log.lock(), vec!["counter:remove:k:Expired".to_string()]);
}

#[test]
fn test_duplicates_are_kept() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addin: Arc<dyn CacheAddin<String, i32>> =
        Arc::new(Recorder::new("twice", &[Hook::AfterGet], &log));
    let mut pipeline = AddinPipeline::new();
    pipeline.attach(Arc::clone(&addin));
    pipeline.attach(addin);

    pipeline.after_get(&entry("k"));

    assert_eq!(pipeline.len(), 2);
    assert_eq!(log.lock().len(), 2);
}
