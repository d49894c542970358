//! Ordered dispatch of hooks to attached addins

use crate::entry::CacheEntry;
use std::collections::HashMap;
use std::sync::Arc;

use super::traits::{CacheAddin, Flow, Hook, RemovalReason, SweepTarget, SweepTrigger};

/// The addins attached to one cache, in registration order
pub struct AddinPipeline<K, V> {
    addins: Vec<Arc<dyn CacheAddin<K, V>>>,
    /// Indexes into `addins` per hook, in registration order
    routes: HashMap<Hook, Vec<usize>>,
}

impl<K, V> AddinPipeline<K, V> {
    pub fn new() -> Self {
        Self {
            addins: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// Append an addin; duplicates are kept
    pub fn attach(&mut self, addin: Arc<dyn CacheAddin<K, V>>) {
        let index = self.addins.len();
        for hook in addin.hooks() {
            let route = self.routes.entry(*hook).or_default();
            if !route.contains(&index) {
                route.push(index);
            }
        }
        self.addins.push(addin);
    }

    pub fn len(&self) -> usize {
        self.addins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addins.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Arc<dyn CacheAddin<K, V>>> {
        self.addins.get(index)
    }

    /// Addins that asked for a background timer, with their period
    pub(crate) fn timer_requests(&self) -> Vec<(usize, std::time::Duration)> {
        self.addins
            .iter()
            .enumerate()
            .filter_map(|(index, addin)| addin.sweep_interval().map(|period| (index, period)))
            .collect()
    }

    pub fn handles(&self, hook: Hook) -> bool {
        self.routes.get(&hook).is_some_and(|route| !route.is_empty())
    }

    /// Call `call` on every addin registered for `hook`, in order
    ///
    /// Returns `Reject` if an addin vetoed, `Continue` otherwise.
    fn dispatch(
        &self,
        hook: Hook,
        skip: Option<usize>,
        mut call: impl FnMut(&dyn CacheAddin<K, V>) -> Flow,
    ) -> Flow {
        let Some(route) = self.routes.get(&hook) else {
            return Flow::Continue;
        };

        for &index in route {
            if Some(index) == skip {
                continue;
            }
            let addin = &self.addins[index];
            match call(addin.as_ref()) {
                Flow::Continue => {}
                Flow::Stop => {
                    tracing::trace!(addin = addin.name(), ?hook, "addin stopped pipeline");
                    return Flow::Continue;
                }
                Flow::Reject => {
                    tracing::debug!(addin = addin.name(), ?hook, "addin rejected action");
                    return Flow::Reject;
                }
            }
        }

        Flow::Continue
    }

    pub(crate) fn before_add(&self, key: &K, value: &V) -> Flow {
        self.dispatch(Hook::BeforeAdd, None, |addin| addin.on_before_add(key, value))
    }

    pub(crate) fn after_add(&self, entry: &CacheEntry<K, V>) -> Flow {
        self.dispatch(Hook::AfterAdd, None, |addin| addin.on_after_add(entry))
    }

    pub(crate) fn before_get(&self, key: &K) -> Flow {
        self.dispatch(Hook::BeforeGet, None, |addin| addin.on_before_get(key))
    }

    pub(crate) fn after_get(&self, entry: &CacheEntry<K, V>) -> Flow {
        self.dispatch(Hook::AfterGet, None, |addin| addin.on_after_get(entry))
    }

    /// Tell addins about a removal; `origin` is the addin that caused it, if any
    pub(crate) fn removed(
        &self,
        entry: &CacheEntry<K, V>,
        reason: RemovalReason,
        origin: Option<usize>,
    ) {
        // a removal has already happened, so a veto here means nothing
        let _ = self.dispatch(Hook::Remove, origin, |addin| addin.on_remove(entry, reason));
    }

    /// Run one addin's sweep hook
    pub(crate) fn sweep_one(
        &self,
        index: usize,
        target: &dyn SweepTarget<K, V>,
        trigger: SweepTrigger,
    ) -> Flow {
        match self.get(index) {
            Some(addin) if addin.hooks().contains(&Hook::Sweep) => addin.on_sweep(target, trigger),
            _ => Flow::Continue,
        }
    }

    /// Indexes of the addins handling sweeps, in order
    pub(crate) fn sweepers(&self) -> Vec<usize> {
        self.routes.get(&Hook::Sweep).cloned().unwrap_or_default()
    }
}

impl<K, V> Default for AddinPipeline<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
