//! Cancellable idle timer — the single debouncing device in the engine.
//!
//! Every parameter change restarts the timer; only when the quiet window
//! elapses uninterrupted does `fire` report true.  Restarting supersedes any
//! pending deadline, so "the latest scheduled regeneration wins" is enforced
//! in one place rather than by scattered clear/set calls.
//!
//! Time is always passed in by the caller, never read from a global clock,
//! which keeps the state machine deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct IdleTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// (Re)start the quiet window from `now`.  Any previously scheduled
    /// deadline is discarded.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Discard any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while a deadline is scheduled.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per scheduled window, when `now` has passed
    /// the deadline.  Firing disarms the timer.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_window() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_millis(1000));
        timer.restart(t0);

        assert!(!timer.fire(t0 + Duration::from_millis(999)));
        assert!(timer.fire(t0 + Duration::from_millis(1000)));
        // Disarmed after firing.
        assert!(!timer.fire(t0 + Duration::from_millis(2000)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_restart_supersedes_pending_deadline() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_millis(1000));
        timer.restart(t0);
        timer.restart(t0 + Duration::from_millis(800));

        // Original deadline passes without firing.
        assert!(!timer.fire(t0 + Duration::from_millis(1100)));
        // Only the superseding deadline counts.
        assert!(timer.fire(t0 + Duration::from_millis(1800)));
    }

    #[test]
    fn test_cancel_discards_deadline() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(Duration::from_millis(300));
        timer.restart(t0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(t0 + Duration::from_secs(10)));
    }
}
