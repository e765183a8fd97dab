//! Time source for timestamps and phase holds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

/// Where the pipeline gets "now" and how it waits.
///
/// Injected so that phase transitions can be driven without wall-clock waits.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall time, used for record timestamps and ids
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real time, backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock that never blocks: `sleep` returns at once and advances `now`.
///
/// Every requested duration is recorded, so callers can assert on holds.
#[derive(Debug)]
pub struct VirtualClock {
    inner: Mutex<VirtualState>,
}

#[derive(Debug)]
struct VirtualState {
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
}

impl VirtualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(VirtualState {
                now,
                sleeps: Vec::new(),
            }),
        }
    }

    /// Durations passed to `sleep`, in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().sleeps.clone()
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.now += chrono::Duration::from_std(by).unwrap_or_default();
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        self.inner.lock().sleeps.push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
