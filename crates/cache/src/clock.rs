//! Time sources for entry metrics and sweep scheduling

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of the current time
///
/// `now` is monotonic and drives entry metrics and debouncing. `wall` is
/// for callers that compare against calendar timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn wall(&self) -> DateTime<Utc>;
}

/// The real clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Both readings advance together, so a duration measured on one matches
/// the other.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Total time advanced since construction
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }

    fn wall(&self) -> DateTime<Utc> {
        let offset = *self.offset.lock();
        // chrono::Duration cannot hold every std Duration; saturate instead of panicking
        match chrono::Duration::from_std(offset) {
            Ok(delta) => self.wall_origin + delta,
            Err(_) => DateTime::<Utc>::MAX_UTC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_on_advance() {
        let clock = ManualClock::new();
        let start = clock.now();
        let wall_start = clock.wall();

        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(4));
        assert_eq!(clock.now() - start, Duration::from_secs(4));
        assert_eq!(clock.wall() - wall_start, chrono::Duration::seconds(4));
        assert_eq!(clock.elapsed(), Duration::from_secs(4));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
