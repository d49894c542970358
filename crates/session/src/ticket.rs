//! Session tickets

use crate::account::Account;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ticket issued to an account at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTicket {
    /// Opaque lookup key presented by the client
    pub key: String,
    pub account_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionTicket {
    /// Issue a ticket valid for `lifetime` from `issued_at`
    pub fn issue(
        key: impl Into<String>,
        account_id: Uuid,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            key: key.into(),
            account_id,
            issued_at,
            expires_at: issued_at + lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    /// Time left before `expires_at`, zero once passed
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

/// What the cache stores per ticket key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketAccountEntry {
    pub ticket: SessionTicket,
    pub account: Account,
}

impl TicketAccountEntry {
    pub fn new(ticket: SessionTicket, account: Account) -> Self {
        Self { ticket, account }
    }

    pub fn into_parts(self) -> (SessionTicket, Account) {
        (self.ticket, self.account)
    }
}
