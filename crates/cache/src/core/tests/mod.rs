//! Cache facade tests


use crate::addin::{CacheAddin, Flow, Hook, RemovalReason};
use crate::entry::CacheEntry;
use parking_lot::Mutex;

/// Records every removal it is told about
#[derive(Default)]
pub(super) struct RemovalLog {
    pub removed: Mutex<Vec<(String, RemovalReason)>>,
}

impl RemovalLog {
    pub fn reasons_for(&self, key: &str) -> Vec<RemovalReason> {
        self.removed
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, reason)| *reason)
            .collect()
    }
}

impl CacheAddin<String, i32> for RemovalLog {
    fn name(&self) -> &str {
        "removal-log"
    }

    fn hooks(&self) -> &'static [Hook] {
        &[Hook::Remove]
    }

    fn on_remove(&self, entry: &CacheEntry<String, i32>, reason: RemovalReason) -> Flow {
        self.removed.lock().push((entry.key().clone(), reason));
        Flow::Continue
    }
}

/// Vetoes every add for keys starting with a prefix
pub(super) struct PrefixVeto(pub &'static str);

impl CacheAddin<String, i32> for PrefixVeto {
    fn name(&self) -> &str {
        "prefix-veto"
    }

    fn hooks(&self) -> &'static [Hook] {
        &[Hook::BeforeAdd]
    }

    fn on_before_add(&self, key: &String, _value: &i32) -> Flow {
        if key.starts_with(self.0) {
            Flow::Reject
        } else {
            Flow::Continue
        }
    }
}
