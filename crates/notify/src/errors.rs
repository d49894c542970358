//! Errors raised by notification sources

use cachet_cache::CacheError;

/// Result type alias for notification source operations
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors raised by a notification source
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A source needs a non-empty id
    #[error("notify source id must not be empty")]
    EmptyId,

    /// The factory did not produce a required provider
    #[error("provider '{name}' was not instanced")]
    ProviderNotInstanced { name: &'static str },

    /// The provider cache failed
    #[error("provider cache error: {0}")]
    Cache(#[from] CacheError),
}
