//! Error handling for the cache engine
//!
//! Every error carries a [`RecoveryHint`] so callers can decide whether a
//! failure is worth retrying or needs operator attention.

mod display;
mod recovery;
mod types;

pub use types::*;
