//! Periodic scheduling: drift-free deadlines and interruptible sleeps.
//!
//! A [`PeriodicTimer`] remembers the deadline it last woke for. The next
//! deadline is always `previous deadline + period`, never `now + period`,
//! so time spent doing the work of a cycle does not push later cycles back.
//! If a deadline is already in the past the sleep returns immediately and
//! the task catches up.
//!
//! ```text
//!   start        d1            d2                 d3
//!     │──period──►│───period────►│─────period───────►│
//!                 └ work ┘       └─ work ─┘
//! ```
//!
//! A [`CancelToken`] is the only way a task ever stops. Tasks sleep on it
//! with [`CancelToken::sleep_until`], which returns early once the token is
//! cancelled. Without a cancellation the tasks run forever.

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Absolute-deadline bookkeeping for one periodic task.
///
/// # Examples
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use periodici::schedule::PeriodicTimer;
///
/// let start = Instant::now();
/// let mut timer = PeriodicTimer::starting_at(start);
///
/// assert_eq!(timer.advance(Duration::from_millis(10)), start + Duration::from_millis(10));
/// assert_eq!(timer.advance(Duration::from_millis(5)), start + Duration::from_millis(15));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    last_wake: Instant,
    cycles: u64,
}

impl PeriodicTimer {
    /// Starts counting periods from now.
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Starts counting periods from `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            last_wake: origin,
            cycles: 0,
        }
    }

    /// Moves the deadline forward by `period` and returns it.
    pub fn advance(&mut self, period: Duration) -> Instant {
        self.last_wake += period;
        self.cycles += 1;
        self.last_wake
    }

    /// The most recent deadline.
    pub fn last_wake(&self) -> Instant {
        self.last_wake
    }

    /// Number of periods elapsed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[derive(Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// A cooperative cancellation flag shared by every task of a system.
///
/// Clones share the same flag.
///
/// # Examples
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use periodici::schedule::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(token.sleep_until(Instant::now() + Duration::from_millis(1)));
///
/// token.cancel();
/// assert!(!token.sleep_until(Instant::now() + Duration::from_secs(60)));
/// ```
#[derive(Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every sleeper.
    ///
    /// Cancellation is permanent.
    pub fn cancel(&self) {
        let mut cancelled = self.state.cancelled.lock();
        *cancelled = true;
        self.state.wakeup.notify_all();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Sleeps until `deadline`.
    ///
    /// Returns `true` if the deadline was reached, or `false` if the token
    /// was cancelled first. A deadline in the past returns at once.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        let mut cancelled = self.state.cancelled.lock();
        while !*cancelled {
            if self
                .state
                .wakeup
                .wait_until(&mut cancelled, deadline)
                .timed_out()
            {
                return !*cancelled;
            }
        }
        false
    }
}

impl Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_advance_is_drift_free() {
        let origin = Instant::now();
        let mut timer = PeriodicTimer::starting_at(origin);

        timer.advance(Duration::from_millis(10));
        // Pretend the work of the cycle took a while.
        thread::sleep(Duration::from_millis(5));
        let next = timer.advance(Duration::from_millis(10));

        assert_eq!(next, origin + Duration::from_millis(20));
        assert_eq!(timer.cycles(), 2);
    }

    #[test]
    fn test_last_wake_tracks_deadline() {
        let origin = Instant::now();
        let mut timer = PeriodicTimer::starting_at(origin);
        assert_eq!(timer.last_wake(), origin);
        let d = timer.advance(Duration::from_secs(1));
        assert_eq!(timer.last_wake(), d);
    }

    #[test]
    fn test_sleep_until_reaches_deadline() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(token.sleep_until(start + Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_past_deadline_returns_immediately() {
        let token = CancelToken::new();
        let past = Instant::now();
        thread::sleep(Duration::from_millis(1));

        let before = Instant::now();
        assert!(token.sleep_until(past));
        assert!(before.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_cancel_wakes_sleeper() {
        let token = CancelToken::new();
        let sleeper = token.clone();

        let start = Instant::now();
        let handle =
            thread::spawn(move || sleeper.sleep_until(Instant::now() + Duration::from_secs(60)));

        thread::sleep(Duration::from_millis(20));
        token.cancel();

        assert!(!handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_cancel_is_shared_and_permanent() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(!clone.sleep_until(Instant::now()));
    }
}
