use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Result, SchedulerError};

/// Shared cancellation flag, checked at every suspension point per the
/// scheduler's "check at every suspension point" rule. The `Condvar` lets a
/// waiting owner wake promptly on cancel rather than polling.
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    signal: Arc<(Mutex<()>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            signal: Arc::new((Mutex::new(()), Condvar::new())),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let (_lock, cvar) = &*self.signal;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SchedulerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A single absolute deadline shared across a dispatch loop. Cheap to check
/// at every suspension point alongside the cancellation token.
#[derive(Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn check(&self) -> Result<()> {
        let elapsed = self.start.elapsed();
        if elapsed > self.budget {
            Err(SchedulerError::DeadlineExceeded {
                elapsed_ms: elapsed.as_millis(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn cancellation_token_reports_state() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
        token.cancel();
        assert!(matches!(token.check(), Err(SchedulerError::Cancelled)));
    }

    #[test]
    fn cancellation_is_visible_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            remote.cancel();
        });
        handle.join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn deadline_trips_after_budget() {
        let deadline = Deadline::after(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(10));
        assert!(matches!(
            deadline.check(),
            Err(SchedulerError::DeadlineExceeded { .. })
        ));
    }

    #[test]
    fn deadline_does_not_trip_before_budget() {
        let deadline = Deadline::after(Duration::from_secs(10));
        assert!(deadline.check().is_ok());
    }
}
