//! Recovery utilities for cache errors

use super::types::{CacheError, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::Configuration { recovery_hint, .. }
            | Self::CapacityExceeded { recovery_hint, .. }
            | Self::Timer { recovery_hint, .. }
            | Self::Io { recovery_hint, .. }
            | Self::Serialization { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.recovery_hint(),
            RecoveryHint::Retry | RecoveryHint::RunEviction
        )
    }

    /// Check if this error comes from the storage backend
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Check if this error was raised while validating configuration
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Serialization { .. } | Self::Io { .. }
        )
    }
}
