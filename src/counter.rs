//! The shared counter mutated by the periodic tasks.
//!
//! [`SharedCounter`] holds a single `i32` behind a [`TimedLock`]. Every
//! operation acquires the lock with a bounded wait, performs one read or
//! mutation and releases it, so no caller ever observes a torn value.
//!
//! # Lock Timeouts
//!
//! The plain operations ([`increment`](SharedCounter::increment),
//! [`multiply`](SharedCounter::multiply), [`read`](SharedCounter::read),
//! [`read_and_clear`](SharedCounter::read_and_clear)) degrade rather than
//! block: if the lock is not acquired within the timeout they return the
//! sentinel `0` and leave the value alone. A skipped mutation is therefore
//! indistinguishable from a legitimate zero result.
//!
//! Callers that care use the `try_` variants, which return
//! `Err(LockTimeout)` on the same path. The plain operations are thin
//! wrappers over them.
//!
//! # Arithmetic
//!
//! The value is unbounded in the sense that nothing clamps it: additions and
//! multiplications wrap on overflow.

use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_utils::CachePadded;

use crate::lock::{LockTimeout, TimedLock};

/// Value returned by the plain operations when the lock times out.
pub const SENTINEL: i32 = 0;

/// An `i32` shared between tasks, guarded by a bounded-wait lock.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use periodici::counter::SharedCounter;
///
/// let counter = SharedCounter::new(Duration::from_millis(100));
///
/// assert_eq!(counter.increment(3), 3);
/// assert_eq!(counter.multiply(4), 12);
/// assert_eq!(counter.read_and_clear(), 12);
/// assert_eq!(counter.read(), 0);
/// ```
///
/// Sharing between threads:
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
/// use periodici::counter::SharedCounter;
///
/// let counter = Arc::new(SharedCounter::new(Duration::from_secs(1)));
/// let worker = Arc::clone(&counter);
/// thread::spawn(move || worker.increment(5)).join().unwrap();
///
/// assert_eq!(counter.read(), 5);
/// ```
pub struct SharedCounter {
    name: &'static str,
    value: TimedLock<i32>,
    lock_timeouts: CachePadded<AtomicU64>,
}

impl SharedCounter {
    /// Creates a counter at zero whose lock waits at most `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            name: "",
            value: TimedLock::new(0, timeout),
            lock_timeouts: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Returns the name of this counter, or `""` if unnamed.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds `step` and returns the new value, or [`SENTINEL`] on timeout.
    #[inline]
    pub fn increment(&self, step: i32) -> i32 {
        self.try_increment(step).unwrap_or(SENTINEL)
    }

    /// Multiplies by `step` and returns the new value, or [`SENTINEL`] on
    /// timeout.
    #[inline]
    pub fn multiply(&self, step: i32) -> i32 {
        self.try_multiply(step).unwrap_or(SENTINEL)
    }

    /// Returns the current value, or [`SENTINEL`] on timeout.
    #[inline]
    pub fn read(&self) -> i32 {
        self.try_read().unwrap_or(SENTINEL)
    }

    /// Returns the current value and resets it to zero, or returns
    /// [`SENTINEL`] without resetting on timeout.
    #[inline]
    pub fn read_and_clear(&self) -> i32 {
        self.try_read_and_clear().unwrap_or(SENTINEL)
    }

    /// Adds `step` and returns the new value.
    pub fn try_increment(&self, step: i32) -> Result<i32, LockTimeout> {
        self.locked(|v| {
            *v = v.wrapping_add(step);
            *v
        })
    }

    /// Multiplies by `step` and returns the new value.
    pub fn try_multiply(&self, step: i32) -> Result<i32, LockTimeout> {
        self.locked(|v| {
            *v = v.wrapping_mul(step);
            *v
        })
    }

    /// Returns the current value.
    pub fn try_read(&self) -> Result<i32, LockTimeout> {
        self.locked(|v| *v)
    }

    /// Returns the current value and resets it to zero.
    pub fn try_read_and_clear(&self) -> Result<i32, LockTimeout> {
        self.locked(std::mem::take)
    }

    /// Number of operations skipped because the lock timed out.
    pub fn lock_timeouts(&self) -> u64 {
        self.lock_timeouts.load(Ordering::Relaxed)
    }

    /// Holds the counter lock without a timeout, to provoke timeouts in
    /// tests.
    #[cfg(test)]
    pub(crate) fn hold_lock(&self) -> parking_lot::MutexGuard<'_, i32> {
        self.value.hold()
    }

    #[inline]
    fn locked(&self, f: impl FnOnce(&mut i32) -> i32) -> Result<i32, LockTimeout> {
        self.value.with(f).inspect_err(|_| {
            self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
        })
    }
}

impl Display for SharedCounter {
    /// Formats the counter as `name:value` if named, or just `value`
    /// otherwise. A busy lock renders as `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.with(|v| *v);
        if !self.name.is_empty() {
            write!(f, "{}:", self.name)?;
        }
        match value {
            Ok(v) => write!(f, "{v}"),
            Err(_) => write!(f, "?"),
        }
    }
}

impl Debug for SharedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCounter")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("lock_timeouts", &self.lock_timeouts())
            .finish()
    }
}
