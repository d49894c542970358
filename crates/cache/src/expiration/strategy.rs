//! Expiration check strategy configuration

use crate::errors::{CacheError, RecoveryHint, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Which timestamp a time-based predicate should reason about
///
/// Advisory: predicates always receive the full metrics, this only decides
/// what [`MetricsSnapshot::elapsed`](crate::MetricsSnapshot::elapsed) returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCheckStrategy {
    /// Age since insertion
    #[default]
    ByAddDate,
    /// Time since the last read
    ByLastAccess,
}

/// When eviction passes run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStrategy {
    /// Synchronously, before every cache call returns
    #[default]
    OnEveryAction,
    /// On a background timer
    Periodic,
}

impl FromStr for TimeCheckStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "by_add_date" | "add_date" | "created" => Ok(Self::ByAddDate),
            "by_last_access" | "last_access" | "accessed" => Ok(Self::ByLastAccess),
            _ => Err(CacheError::Configuration {
                message: format!("Unknown time check strategy: {s}"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "by_add_date".to_string(),
                },
            }),
        }
    }
}

impl FromStr for CheckStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "on_every_action" | "every_action" => Ok(Self::OnEveryAction),
            "periodic" => Ok(Self::Periodic),
            _ => Err(CacheError::Configuration {
                message: format!("Unknown check strategy: {s}"),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "on_every_action".to_string(),
                },
            }),
        }
    }
}

/// How and when an expiration addin checks entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationCheckStrategy {
    #[serde(default)]
    pub time_check: TimeCheckStrategy,
    #[serde(default)]
    pub check: CheckStrategy,
    /// Timer interval when periodic
    #[serde(
        rename = "check_period_ms",
        with = "duration_ms",
        default = "default_check_period"
    )]
    pub check_period: Duration,
    /// Minimum spacing between two sweeps
    #[serde(rename = "check_in_period_ms", with = "duration_ms", default)]
    pub check_in_period: Duration,
}

impl Default for ExpirationCheckStrategy {
    fn default() -> Self {
        Self::on_every_action()
    }
}

impl ExpirationCheckStrategy {
    /// Sweep before every cache call returns, with no spacing
    pub fn on_every_action() -> Self {
        Self {
            time_check: TimeCheckStrategy::ByAddDate,
            check: CheckStrategy::OnEveryAction,
            check_period: Duration::from_secs(1),
            check_in_period: Duration::ZERO,
        }
    }

    /// Sweep on a timer firing every `period`
    pub fn periodic(period: Duration) -> Self {
        Self {
            time_check: TimeCheckStrategy::ByAddDate,
            check: CheckStrategy::Periodic,
            check_period: period,
            check_in_period: period,
        }
    }

    pub fn with_time_check(mut self, time_check: TimeCheckStrategy) -> Self {
        self.time_check = time_check;
        self
    }

    pub fn with_check_period(mut self, period: Duration) -> Self {
        self.check_period = period;
        self
    }

    pub fn with_check_in_period(mut self, spacing: Duration) -> Self {
        self.check_in_period = spacing;
        self
    }

    /// Reject combinations that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.check == CheckStrategy::Periodic && self.check_period.is_zero() {
            return Err(CacheError::Configuration {
                message: "check_period must be greater than zero for periodic expiration"
                    .to_string(),
                recovery_hint: RecoveryHint::UseDefault {
                    value: "1000ms".to_string(),
                },
            });
        }
        Ok(())
    }
}

fn default_check_period() -> Duration {
    Duration::from_secs(1)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
