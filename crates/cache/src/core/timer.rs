//! Background sweep timer management

use crate::addin::{panic_message, SweepTrigger};
use crate::errors::{CacheError, RecoveryHint, Result};
use crossbeam::channel::{self, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::types::{CacheInner, CacheKey, CacheValue};

/// A thread calling one addin's sweep hook at a fixed period
///
/// The thread only holds a weak reference to the cache and exits as soon
/// as the cache is gone or the timer is dropped. Dropping the timer joins
/// the thread unless the drop happens on that thread itself.
pub(super) struct SweepTimer {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepTimer {
    /// Start the timer for the addin at `index`
    pub fn start<K, V>(inner: &Arc<CacheInner<K, V>>, index: usize, period: Duration) -> Result<Self>
    where
        K: CacheKey,
        V: CacheValue,
    {
        let addin = inner
            .pipeline
            .get(index)
            .map(|addin| addin.name().to_string())
            .unwrap_or_default();

        if period.is_zero() {
            return Err(CacheError::configuration(format!(
                "addin '{addin}' asked for a sweep timer with a zero period"
            )));
        }

        let weak = Arc::downgrade(inner);
        let (shutdown, stopped) = channel::bounded::<()>(1);
        let thread_addin = addin.clone();

        let handle = std::thread::Builder::new()
            .name(format!("cache-sweep-{index}"))
            .spawn(move || {
                let ticker = channel::tick(period);
                tracing::debug!(addin = %thread_addin, period_ms = period.as_millis() as u64, "sweep timer started");

                loop {
                    channel::select! {
                        recv(ticker) -> _ => {
                            let Some(inner) = weak.upgrade() else {
                                break;
                            };
                            let swept = panic::catch_unwind(AssertUnwindSafe(|| {
                                inner.run_sweep(index, SweepTrigger::Timer);
                            }));
                            if let Err(payload) = swept {
                                // A panicking sweep must not end the timer
                                tracing::warn!(
                                    addin = %thread_addin,
                                    panic = panic_message(payload.as_ref()),
                                    "timer sweep panicked; retrying on next tick"
                                );
                            }
                        }
                        recv(stopped) -> _ => break,
                    }
                }

                tracing::debug!(addin = %thread_addin, "sweep timer stopped");
            })
            .map_err(|e| CacheError::Timer {
                addin,
                source: e,
                recovery_hint: RecoveryHint::Retry,
            })?;

        Ok(Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }
}

impl Drop for SweepTimer {
    fn drop(&mut self) {
        // Disconnecting the channel wakes the thread's select
        drop(self.shutdown.take());

        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == std::thread::current().id() {
                // The timer thread released the last cache handle; it exits on its next loop
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("sweep timer thread panicked");
            }
        }
    }
}
