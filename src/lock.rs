//! Mutual exclusion with a bounded wait.
//!
//! [`TimedLock`] wraps a [`parking_lot::Mutex`] and never waits longer than
//! a fixed timeout to acquire it. When the timeout expires the caller gets a
//! [`LockTimeout`] instead of the guarded value and is expected to carry on
//! with a fallback. This is the building block behind
//! [`SharedCounter`](crate::counter::SharedCounter) and
//! [`SharedRandom`](crate::random::SharedRandom).
//!
//! ```text
//!   task A ──try_lock_for(100 ticks)──► ┌───────────┐
//!   task B ──try_lock_for(100 ticks)──► │ Mutex<T>  │ ──► Ok(f(&mut T))
//!   task C ──try_lock_for(100 ticks)──► └───────────┘ ──► Err(LockTimeout)
//! ```

use std::fmt::{self, Debug};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

/// The lock was not acquired within its bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lock not acquired within {waited:?}")]
pub struct LockTimeout {
    /// How long the caller waited before giving up.
    pub waited: Duration,
}

/// A value guarded by a mutex that is acquired with a bounded wait.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use periodici::lock::TimedLock;
///
/// let lock = TimedLock::new(41, Duration::from_millis(100));
/// assert_eq!(lock.with(|v| { *v += 1; *v }), Ok(42));
/// ```
pub struct TimedLock<T> {
    inner: Mutex<T>,
    timeout: Duration,
}

impl<T> TimedLock<T> {
    /// Creates a new lock around `value` with the given acquisition timeout.
    pub fn new(value: T, timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(value),
            timeout,
        }
    }

    /// Returns the bounded wait used on every acquisition.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `f` on the guarded value while holding the lock.
    ///
    /// Waits at most [`timeout`](Self::timeout) for the lock. On timeout `f`
    /// is not called and the value is left untouched.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, LockTimeout> {
        match self.inner.try_lock_for(self.timeout) {
            Some(mut guard) => Ok(f(&mut guard)),
            None => Err(LockTimeout {
                waited: self.timeout,
            }),
        }
    }

    /// Consumes the lock and returns the guarded value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    /// Acquires the lock without a timeout. Used by tests to provoke
    /// contention on purpose.
    #[cfg(test)]
    pub(crate) fn hold(&self) -> parking_lot::MutexGuard<'_, T> {
        self.inner.lock()
    }
}

impl<T: Debug> Debug for TimedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("TimedLock");
        match self.inner.try_lock() {
            Some(guard) => d.field("value", &*guard),
            None => d.field("value", &format_args!("<locked>")),
        };
        d.field("timeout", &self.timeout).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_with_returns_closure_result() {
        let lock = TimedLock::new(String::from("a"), Duration::from_millis(10));
        let len = lock.with(|s| {
            s.push('b');
            s.len()
        });
        assert_eq!(len, Ok(2));
        assert_eq!(lock.into_inner(), "ab");
    }

    #[test]
    fn test_timeout_when_held() {
        let lock = TimedLock::new(0, Duration::from_millis(20));
        let _guard = lock.hold();

        let result = lock.with(|v| *v += 1);
        assert_eq!(
            result,
            Err(LockTimeout {
                waited: Duration::from_millis(20)
            })
        );
    }

    #[test]
    fn test_timeout_leaves_value_untouched() {
        let lock = TimedLock::new(7, Duration::from_millis(5));
        {
            let _guard = lock.hold();
            assert!(lock.with(|v| *v = 0).is_err());
        }
        assert_eq!(lock.with(|v| *v), Ok(7));
    }

    #[test]
    fn test_waits_for_short_holder() {
        let lock = Arc::new(TimedLock::new(0, Duration::from_secs(5)));
        let holder = Arc::clone(&lock);

        let guard = lock.hold();
        let handle = thread::spawn(move || holder.with(|v| *v + 1));
        thread::sleep(Duration::from_millis(10));
        drop(guard);

        assert_eq!(handle.join().unwrap(), Ok(1));
    }

    #[test]
    fn test_debug_shows_locked() {
        let lock = TimedLock::new(3, Duration::from_millis(1));
        assert!(format!("{:?}", lock).contains("value: 3"));
        let _guard = lock.hold();
        assert!(format!("{:?}", lock).contains("<locked>"));
    }

    #[test]
    fn test_lock_timeout_display() {
        let err = LockTimeout {
            waited: Duration::from_millis(100),
        };
        assert_eq!(err.to_string(), "lock not acquired within 100ms");
    }
}
