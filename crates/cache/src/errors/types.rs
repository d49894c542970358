//! Core error types for the cache engine

use std::path::PathBuf;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for callers that prefer the short name
pub use CacheError as Error;

/// Error type for cache construction and cache operations
#[derive(Debug)]
pub enum CacheError {
    /// Invalid construction options or strategy combination
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// The storage backend refused a new entry because it is full
    CapacityExceeded {
        capacity: usize,
        recovery_hint: RecoveryHint,
    },

    /// A background sweep timer could not be started
    Timer {
        addin: String,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// I/O errors while reading configuration
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Malformed configuration document
    Serialization {
        key: String,
        operation: SerializationOp,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Retry the operation
    Retry,

    /// Remove entries and retry
    RunEviction,

    /// Increase cache capacity
    IncreaseCapacity { suggested_entries: usize },

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Use a default value
    UseDefault { value: String },

    /// Update cache configuration
    UpdateConfiguration,

    /// No automated recovery possible
    Manual { instructions: String },
}

/// Serialization operation types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationOp {
    Decode,
}

impl CacheError {
    /// Shorthand for a configuration error that is fixed by editing settings
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }

    /// An equivalent error for another caller
    ///
    /// Wrapped sources are rebuilt from their kind and message, so the copy
    /// displays the same but does not share the original source value.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            Self::Configuration {
                message,
                recovery_hint,
            } => Self::Configuration {
                message: message.clone(),
                recovery_hint: recovery_hint.clone(),
            },
            Self::CapacityExceeded {
                capacity,
                recovery_hint,
            } => Self::CapacityExceeded {
                capacity: *capacity,
                recovery_hint: recovery_hint.clone(),
            },
            Self::Timer {
                addin,
                source,
                recovery_hint,
            } => Self::Timer {
                addin: addin.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
                recovery_hint: recovery_hint.clone(),
            },
            Self::Io {
                path,
                operation,
                source,
                recovery_hint,
            } => Self::Io {
                path: path.clone(),
                operation: *operation,
                source: std::io::Error::new(source.kind(), source.to_string()),
                recovery_hint: recovery_hint.clone(),
            },
            Self::Serialization {
                key,
                operation,
                source,
                recovery_hint,
            } => Self::Serialization {
                key: key.clone(),
                operation: operation.clone(),
                source: source.to_string().into(),
                recovery_hint: recovery_hint.clone(),
            },
        }
    }
}
