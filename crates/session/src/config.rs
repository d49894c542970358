//! Ticket cache configuration

use crate::errors::{Result, SessionError};
use crate::ticket::SessionTicket;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Timing options for [`SessionTicketCache`](crate::SessionTicketCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketCacheConfig {
    /// Extra time a ticket stays cached after `expires_at`
    pub grace: Duration,
    /// Allowed disagreement between our clock and the issuer's, either way
    pub clock_skew: Duration,
    /// How often the sweep timer fires
    pub check_period: Duration,
    /// Minimum spacing between two sweeps
    pub check_in_period: Duration,
}

impl Default for TicketCacheConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            clock_skew: Duration::ZERO,
            check_period: Duration::from_secs(1),
            check_in_period: Duration::from_secs(1),
        }
    }
}

impl TicketCacheConfig {
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_period.is_zero() {
            return Err(SessionError::InvalidConfig {
                message: "check_period must be greater than zero".to_string(),
            });
        }
        self.slack()?;
        Ok(())
    }

    /// Grace and skew combined, as a calendar duration
    pub(crate) fn slack(&self) -> Result<chrono::Duration> {
        let total = self
            .grace
            .checked_add(self.clock_skew)
            .ok_or_else(|| SessionError::InvalidConfig {
                message: "grace plus clock_skew overflows".to_string(),
            })?;
        chrono::Duration::from_std(total).map_err(|_| SessionError::InvalidConfig {
            message: format!("grace plus clock_skew is out of range: {total:?}"),
        })
    }

    /// Whether `ticket` should no longer be served at `now`
    ///
    /// A ticket expires once `now >= expires_at + grace + clock_skew`.
    pub fn is_expired(&self, ticket: &SessionTicket, now: DateTime<Utc>) -> bool {
        match self.slack() {
            Ok(slack) => match ticket.expires_at.checked_add_signed(slack) {
                Some(deadline) => now >= deadline,
                None => false,
            },
            // unvalidated configuration; fall back to the bare expiry
            Err(_) => now >= ticket.expires_at,
        }
    }
}
