//! A cloneable handle for observing and aborting the pipeline from the UI.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::phase::Phase;

/// A cloneable handle for poking the pipeline from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct GenerationHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) phase: Arc<Mutex<Option<Phase>>>,
    pub(crate) is_running: Arc<AtomicBool>,
}

impl GenerationHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            phase: Arc::new(Mutex::new(None)),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the single in-flight slot, or fail with [`Error::Busy`].
    ///
    /// The returned guard releases the slot when dropped.
    pub(crate) fn begin(&self) -> Result<RunGuard> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        Ok(RunGuard {
            handle: self.clone(),
            token,
        })
    }

    /// Abort the current run.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Phase currently being held, if a run is in flight
    pub fn current_phase(&self) -> Option<Phase> {
        *self.phase.lock()
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }
}

/// Holds the in-flight slot for one run
pub(crate) struct RunGuard {
    handle: GenerationHandle,
    token: CancellationToken,
}

impl RunGuard {
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn enter(&self, phase: Phase) {
        *self.handle.phase.lock() = Some(phase);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        *self.handle.phase.lock() = None;
        self.handle.is_running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_busy() {
        let handle = GenerationHandle::new();
        let guard = handle.begin().unwrap();
        assert!(handle.is_running());
        assert!(matches!(handle.begin(), Err(Error::Busy)));
        drop(guard);
        assert!(!handle.is_running());
        assert!(handle.begin().is_ok());
    }

    #[test]
    fn test_guard_clears_phase_on_drop() {
        let handle = GenerationHandle::new();
        let guard = handle.begin().unwrap();
        guard.enter(Phase::OrganizingNarrative);
        assert_eq!(handle.current_phase(), Some(Phase::OrganizingNarrative));
        drop(guard);
        assert_eq!(handle.current_phase(), None);
    }

    #[test]
    fn test_abort_cancels_current_token_only() {
        let handle = GenerationHandle::new();
        let first = handle.begin().unwrap();
        handle.abort();
        assert!(first.token().is_cancelled());
        drop(first);
        let second = handle.begin().unwrap();
        assert!(!second.token().is_cancelled());
    }
}
