//! The session ticket cache

use crate::account::Account;
use crate::config::TicketCacheConfig;
use crate::errors::{Result, SessionError};
use crate::ticket::{SessionTicket, TicketAccountEntry};
use cachet_cache::{
    Cache, Clock, ExpirationAddin, ExpirationCheckStrategy, ExpirationStats, SystemClock,
    TimeCheckStrategy,
};
use std::sync::Arc;

/// Validated tickets and their accounts, swept on a timer
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct SessionTicketCache {
    cache: Cache<String, TicketAccountEntry>,
    expiration: Arc<ExpirationAddin<String, TicketAccountEntry>>,
    config: TicketCacheConfig,
    clock: Arc<dyn Clock>,
}

impl SessionTicketCache {
    pub fn new(config: TicketCacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the cache reading time from `clock`
    pub fn with_clock(config: TicketCacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let strategy = ExpirationCheckStrategy::periodic(config.check_period)
            .with_time_check(TimeCheckStrategy::ByAddDate)
            .with_check_in_period(config.check_in_period);

        let predicate_clock = Arc::clone(&clock);
        let expiration = ExpirationAddin::<String, TicketAccountEntry>::new(strategy, move |entry: &TicketAccountEntry, _| {
            config.is_expired(&entry.ticket, predicate_clock.wall())
        })?
        .named("session-ticket-expiry");
        let expiration = Arc::new(expiration);

        let cache: Cache<String, TicketAccountEntry> = Cache::builder()
            .clock(Arc::clone(&clock))
            .addin(expiration.clone())
            .build()?;

        tracing::debug!(
            grace_ms = config.grace.as_millis() as u64,
            clock_skew_ms = config.clock_skew.as_millis() as u64,
            check_period_ms = config.check_period.as_millis() as u64,
            "session ticket cache created"
        );

        Ok(Self {
            cache,
            expiration,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &TicketCacheConfig {
        &self.config
    }

    /// Cache a validated ticket
    ///
    /// Returns false, storing nothing, for a ticket that is already expired.
    pub fn insert(&self, ticket: SessionTicket, account: Account) -> Result<bool> {
        if self.config.is_expired(&ticket, self.clock.wall()) {
            tracing::debug!(ticket = %ticket.key, "not caching expired session ticket");
            return Ok(false);
        }
        let key = ticket.key.clone();
        Ok(self.cache.set(key, TicketAccountEntry::new(ticket, account))?)
    }

    /// The ticket and account cached under `key`
    ///
    /// An entry past its expiry is dropped and reported as a miss even if
    /// no sweep has removed it yet.
    pub fn lookup(&self, key: &str) -> Option<(SessionTicket, Account)> {
        let key = key.to_string();
        let entry = self.cache.get(&key)?;
        if self.config.is_expired(&entry.ticket, self.clock.wall()) {
            self.cache.remove(&key);
            return None;
        }
        Some(entry.into_parts())
    }

    /// Look a ticket up, resolving and caching it on a miss
    ///
    /// Racing callers for the same key share a single resolver call. A
    /// resolver error is returned and nothing is cached.
    pub fn lookup_or_resolve<F>(&self, key: &str, resolver: F) -> Result<(SessionTicket, Account)>
    where
        F: FnOnce() -> Result<TicketAccountEntry>,
    {
        let entry = self.cache.try_get_or_add(key.to_string(), || {
            let entry = resolver()?;
            if entry.ticket.key != key {
                return Err(SessionError::resolve(
                    key,
                    format!("resolver returned ticket '{}'", entry.ticket.key),
                ));
            }
            tracing::debug!(ticket = %key, account = %entry.account.id, "session ticket resolved");
            Ok(entry)
        })?;

        if self.config.is_expired(&entry.ticket, self.clock.wall()) {
            self.cache.remove(&key.to_string());
            return Err(SessionError::Expired {
                key: key.to_string(),
            });
        }
        Ok(entry.into_parts())
    }

    /// Drop a ticket, e.g. on logout. Returns whether it was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        self.cache.remove(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Sweep expired tickets now instead of waiting for the timer
    pub fn sweep_now(&self) {
        self.cache.sweep_now();
    }

    pub fn expiration_stats(&self) -> ExpirationStats {
        self.expiration.stats()
    }
}

impl std::fmt::Debug for SessionTicketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTicketCache")
            .field("config", &self.config)
            .field("entries", &self.cache.len())
            .finish()
    }
}
