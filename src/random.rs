//! Bounded pseudo-random integers for jitter and step sizes.
//!
//! Two generators share the same algorithm (xorshift64 with rejection
//! sampling, so every value of `[low, high]` is equally likely):
//!
//! - [`StepRng`] is owned by a single task and needs no synchronization.
//!   Tasks use it for step sizes and, in the Resetter's case, for its own
//!   period.
//! - [`SharedRandom`] is shared by every task for scheduling jitter. Access
//!   is serialized by a [`TimedLock`]; when the lock cannot be acquired in
//!   time a fixed fallback value is returned instead.
//!
//! Both are deterministic for a given seed. They are not cryptographically
//! secure.

use std::fmt::{self, Debug};
use std::time::Duration;

use crate::lock::{LockTimeout, TimedLock};

/// A private xorshift64 generator.
///
/// # Examples
///
/// ```rust
/// use periodici::random::StepRng;
///
/// let mut rng = StepRng::new(42);
/// let step = rng.next(1, 5);
/// assert!((1..=5).contains(&step));
/// ```
#[derive(Debug, Clone)]
pub struct StepRng {
    state: u64,
}

impl StepRng {
    /// Creates a generator from `seed`. A zero seed is replaced with 1,
    /// since xorshift never leaves the all-zero state.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Returns a uniformly distributed value in `[low, high]`.
    ///
    /// Swapped bounds are tolerated in release builds and assert in debug
    /// builds.
    pub fn next(&mut self, low: i32, high: i32) -> i32 {
        debug_assert!(low <= high, "inverted range {low}..={high}");
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        // At most 2^32 values, so the span always fits in a u64.
        let span = (i64::from(high) - i64::from(low) + 1) as u64;
        let threshold = u64::MAX - (u64::MAX % span);
        loop {
            let value = self.next_u64();
            if value < threshold {
                return (i64::from(low) + (value % span) as i64) as i32;
            }
        }
    }
}

/// A generator shared between tasks behind a bounded-wait lock.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use periodici::random::SharedRandom;
///
/// let jitter = SharedRandom::new(1, Duration::from_millis(100), 100);
/// let period = jitter.next(10, 1000);
/// assert!((10..=1000).contains(&period));
/// ```
pub struct SharedRandom {
    rng: TimedLock<StepRng>,
    fallback: i32,
}

impl SharedRandom {
    /// Creates a shared generator.
    ///
    /// `timeout` bounds every lock acquisition and `fallback` is returned
    /// whenever it expires.
    pub fn new(seed: u64, timeout: Duration, fallback: i32) -> Self {
        Self {
            rng: TimedLock::new(StepRng::new(seed), timeout),
            fallback,
        }
    }

    /// Returns a value in `[low, high]`, or the fallback if the generator
    /// is busy for longer than the lock timeout.
    ///
    /// The fallback is not clamped into `[low, high]`.
    #[inline]
    pub fn next(&self, low: i32, high: i32) -> i32 {
        self.try_next(low, high).unwrap_or(self.fallback)
    }

    /// Like [`next`](Self::next) but reports a lock timeout instead of
    /// substituting the fallback.
    pub fn try_next(&self, low: i32, high: i32) -> Result<i32, LockTimeout> {
        self.rng.with(|rng| rng.next(low, high))
    }

    /// Value returned on lock timeout.
    pub fn fallback(&self) -> i32 {
        self.fallback
    }
}

impl Debug for SharedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRandom")
            .field("timeout", &self.rng.timeout())
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_range_10_1000() {
        let mut rng = StepRng::new(1);
        for _ in 0..10_000 {
            let v = rng.next(10, 1000);
            assert!((10..=1000).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_hits_both_ends() {
        let mut rng = StepRng::new(7);
        let mut seen = [false; 5];
        for _ in 0..1_000 {
            seen[(rng.next(1, 5) - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_single_value_range() {
        let mut rng = StepRng::new(3);
        for _ in 0..100 {
            assert_eq!(rng.next(4, 4), 4);
        }
    }

    #[test]
    fn test_full_i32_range() {
        let mut rng = StepRng::new(99);
        for _ in 0..1_000 {
            // Must not overflow the span computation.
            let _ = rng.next(i32::MIN, i32::MAX);
        }
    }

    #[test]
    fn test_negative_range() {
        let mut rng = StepRng::new(5);
        for _ in 0..1_000 {
            let v = rng.next(-3, -1);
            assert!((-3..=-1).contains(&v));
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let mut a = StepRng::new(1234);
        let mut b = StepRng::new(1234);
        let xs: Vec<i32> = (0..32).map(|_| a.next(0, 1_000_000)).collect();
        let ys: Vec<i32> = (0..32).map(|_| b.next(0, 1_000_000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = StepRng::new(0);
        let draws: Vec<i32> = (0..16).map(|_| rng.next(0, 1000)).collect();
        assert!(draws.iter().any(|v| *v != draws[0]));
    }

    #[test]
    fn test_shared_range_across_threads() {
        let jitter = Arc::new(SharedRandom::new(1, Duration::from_secs(1), 100));
        let mut handles = vec![];

        for _ in 0..4 {
            let jitter = Arc::clone(&jitter);
            handles.push(thread::spawn(move || {
                for _ in 0..2_500 {
                    let v = jitter.next(10, 1000);
                    assert!((10..=1000).contains(&v));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_shared_fallback_on_timeout() {
        let jitter = SharedRandom::new(1, Duration::from_millis(5), 100);
        let _guard = jitter.rng.hold();
        assert_eq!(jitter.next(500, 600), 100);
        assert!(jitter.try_next(500, 600).is_err());
    }
}
