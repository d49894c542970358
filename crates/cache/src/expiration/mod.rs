//! Time and predicate driven expiration
//!
//! [`ExpirationAddin`] evicts entries whose predicate says they are
//! expired. When it looks is decided by an [`ExpirationCheckStrategy`]:
//! after every cache action, or on a background timer, with a minimum
//! spacing between two sweeps either way.

mod addin;
mod strategy;

pub use addin::{ExpirationAddin, ExpirationStats, PredicateError};
pub use strategy::{CheckStrategy, ExpirationCheckStrategy, TimeCheckStrategy};

#[cfg(test)]
mod tests;
