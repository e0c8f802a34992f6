//! Debounced value delivery.
//!
//! Only the most recent value survives a quiet period; intermediate values
//! are dropped, never queued. A pending value is discarded when superseded,
//! cancelled, or when its owner is dropped.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use log::trace;
use tokio::task::JoinHandle;

/// Quiet period used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

// =============================================================================
// Debouncer
// =============================================================================

/// Clock-driven debouncer.
///
/// The caller passes the current time to every call, which keeps the engine
/// synchronous and lets tests drive time explicitly.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `value`, replacing any pending one and restarting the
    /// quiet period from `now`.
    pub fn commit(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            trace!("Debounce superseded");
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.delay,
        });
    }

    /// Takes the pending value if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drops the pending value, if any, and returns it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

// =============================================================================
// AsyncDebouncer
// =============================================================================

type Deliver<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Timer-backed debouncer running on the tokio runtime.
///
/// Each [`commit`](Self::commit) aborts the previous timer task and spawns a
/// new one, so the callback fires at most once per quiet period. Dropping
/// the debouncer aborts the pending timer.
///
/// `commit` must be called from within a tokio runtime.
pub struct AsyncDebouncer<T> {
    delay: Duration,
    deliver: Deliver<T>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> AsyncDebouncer<T> {
    pub fn new<F>(delay: Duration, deliver: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            deliver: Arc::new(deliver),
            timer: None,
        }
    }

    /// Schedules `value`, cancelling any pending delivery.
    pub fn commit(&mut self, value: T) {
        self.cancel();
        let delay = self.delay;
        let deliver = Arc::clone(&self.deliver);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deliver(value);
        }));
    }

    /// Aborts the pending delivery, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Returns `true` while a delivery is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl<T> Drop for AsyncDebouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
