//! Addins: policy objects attached to a cache
//!
//! An addin declares which hooks it handles and is called, in attach
//! order, around every cache action. Hooks run inside the cache's critical
//! section and must not call back into the cache.

mod pipeline;
mod traits;

pub use pipeline::AddinPipeline;
pub use traits::{CacheAddin, Flow, Hook, RemovalReason, SweepTarget, SweepTrigger};

/// Best-effort text of a panic raised inside an addin
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests;
