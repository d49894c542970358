//! Errors raised by the session ticket cache

use cachet_cache::CacheError;

/// Result type alias for session ticket operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by the session ticket cache
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The underlying cache failed
    #[error("ticket cache error: {0}")]
    Cache(#[from] CacheError),

    /// The resolver could not produce an account for a ticket
    #[error("failed to resolve session ticket '{key}': {message}")]
    Resolve { key: String, message: String },

    /// The ticket is past its expiry, grace window included
    #[error("session ticket '{key}' has expired")]
    Expired { key: String },

    /// Invalid cache configuration
    #[error("invalid ticket cache configuration: {message}")]
    InvalidConfig { message: String },
}

impl SessionError {
    /// Shorthand for a resolver failure
    pub fn resolve(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            key: key.into(),
            message: message.into(),
        }
    }
}
