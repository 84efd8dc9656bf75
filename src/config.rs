//! Runtime configuration for the task set.
//!
//! [`Config::default()`] reproduces the reference timing of the demo: a
//! 1 ms scheduler tick, a 100-tick bounded wait on every lock, a 512-slot
//! event channel and the per-task jitter ranges listed below.
//!
//! | Setting | Default | Used by |
//! |---------|---------|---------|
//! | `tick_us` | `1000` | lock timeout unit |
//! | `lock_timeout_ticks` | `100` | counter and jitter locks |
//! | `channel_capacity` | `512` | event channel |
//! | `jitter_fallback_ms` | `100` | shared jitter source on lock timeout |
//! | `jitter_ms` | `10..=1000` | Incrementer, Multiplier, Display periods |
//! | `increment_step` | `1..=5` | Incrementer step |
//! | `multiply_step` | `2..=6` | Multiplier step |
//! | `reset_period_secs` | `5..=15` | Resetter period |
//!
//! With the `serde` feature the configuration is (de)serializable; missing
//! fields take their default. The `json` feature adds
//! [`Config::from_json_str`] and [`Config::from_json_file`].

use std::fmt::{self, Display};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Duration of one scheduler tick, in microseconds.
pub const DEFAULT_TICK_US: u64 = 1_000;

/// Bounded wait for every lock acquisition, in ticks.
pub const DEFAULT_LOCK_TIMEOUT_TICKS: u32 = 100;

/// Number of record slots in the event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 512;

/// Value returned by the shared jitter source when its lock times out.
pub const DEFAULT_JITTER_FALLBACK_MS: i32 = 100;

/// An inclusive integer range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// Smallest value that may be drawn.
    pub low: i32,
    /// Largest value that may be drawn.
    pub high: i32,
}

impl Bounds {
    /// Creates a new inclusive range.
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Returns `true` if `value` lies within the range.
    pub fn contains(&self, value: i32) -> bool {
        (self.low..=self.high).contains(&value)
    }

    fn check(&self, field: &str, non_negative: bool) -> Result<()> {
        if self.low > self.high {
            return Err(Error::InvalidConfig(format!(
                "{field}: low ({}) is greater than high ({})",
                self.low, self.high
            )));
        }
        if non_negative && self.low < 0 {
            return Err(Error::InvalidConfig(format!(
                "{field}: periods cannot be negative (low = {})",
                self.low
            )));
        }
        Ok(())
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

/// Seeds for every pseudo-random generator in the system.
///
/// Each generator is deterministic for a given seed, so two runs with the
/// same seeds draw the same step sizes and periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Seeds {
    /// Shared jitter source.
    pub jitter: u64,
    /// Incrementer step generator.
    pub incrementer: u64,
    /// Multiplier step generator.
    pub multiplier: u64,
    /// Resetter period generator.
    pub resetter: u64,
}

impl Seeds {
    /// Derives all four seeds from a single base value.
    pub const fn from_base(base: u64) -> Self {
        Self {
            jitter: base,
            incrementer: base.wrapping_add(1),
            multiplier: base.wrapping_add(2),
            resetter: base.wrapping_add(3),
        }
    }
}

impl Default for Seeds {
    fn default() -> Self {
        Self::from_base(1)
    }
}

/// Configuration of the whole task set.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use periodici::config::{Bounds, Config};
///
/// let config = Config::default()
///     .with_jitter_ms(Bounds::new(1, 5))
///     .with_lock_timeout_ticks(10);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.lock_timeout(), Duration::from_millis(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Config {
    /// Duration of one scheduler tick, in microseconds.
    pub tick_us: u64,
    /// Bounded wait for every lock acquisition, in ticks.
    pub lock_timeout_ticks: u32,
    /// Number of record slots in the event channel.
    pub channel_capacity: usize,
    /// Value returned by the shared jitter source on lock timeout.
    pub jitter_fallback_ms: i32,
    /// Period range of the Incrementer, Multiplier and Display tasks.
    pub jitter_ms: Bounds,
    /// Step range of the Incrementer.
    pub increment_step: Bounds,
    /// Step range of the Multiplier.
    pub multiply_step: Bounds,
    /// Period range of the Resetter, in whole seconds.
    pub reset_period_secs: Bounds,
    /// Generator seeds.
    pub seeds: Seeds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_us: DEFAULT_TICK_US,
            lock_timeout_ticks: DEFAULT_LOCK_TIMEOUT_TICKS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            jitter_fallback_ms: DEFAULT_JITTER_FALLBACK_MS,
            jitter_ms: Bounds::new(10, 1000),
            increment_step: Bounds::new(1, 5),
            multiply_step: Bounds::new(2, 6),
            reset_period_secs: Bounds::new(5, 15),
            seeds: Seeds::default(),
        }
    }
}

impl Config {
    /// Sets the lock timeout in ticks.
    pub fn with_lock_timeout_ticks(mut self, ticks: u32) -> Self {
        self.lock_timeout_ticks = ticks;
        self
    }

    /// Sets the channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the period range of the jittered tasks.
    pub fn with_jitter_ms(mut self, bounds: Bounds) -> Self {
        self.jitter_ms = bounds;
        self
    }

    /// Sets the Resetter period range, in seconds.
    pub fn with_reset_period_secs(mut self, bounds: Bounds) -> Self {
        self.reset_period_secs = bounds;
        self
    }

    /// Sets all generator seeds.
    pub fn with_seeds(mut self, seeds: Seeds) -> Self {
        self.seeds = seeds;
        self
    }

    /// Duration of one scheduler tick.
    pub fn tick(&self) -> Duration {
        Duration::from_micros(self.tick_us)
    }

    /// Bounded wait applied to every lock acquisition.
    pub fn lock_timeout(&self) -> Duration {
        self.tick() * self.lock_timeout_ticks
    }

    /// Checks that every range is well formed and every size is usable.
    pub fn validate(&self) -> Result<()> {
        if self.tick_us == 0 {
            return Err(Error::InvalidConfig("tick_us must be non-zero".into()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::InvalidConfig(
                "channel_capacity must be non-zero".into(),
            ));
        }
        if self.jitter_fallback_ms < 0 {
            return Err(Error::InvalidConfig(format!(
                "jitter_fallback_ms cannot be negative ({})",
                self.jitter_fallback_ms
            )));
        }
        self.jitter_ms.check("jitter_ms", true)?;
        self.increment_step.check("increment_step", false)?;
        self.multiply_step.check("multiply_step", false)?;
        self.reset_period_secs.check("reset_period_secs", true)?;
        Ok(())
    }

    /// Parses a configuration from JSON and validates it.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file and validates it.
    #[cfg(feature = "json")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.channel_capacity, 512);
        assert_eq!(config.jitter_ms, Bounds::new(10, 1000));
    }

    #[test]
    fn test_lock_timeout_is_100_ticks() {
        let config = Config::default();
        assert_eq!(config.tick(), Duration::from_millis(1));
        assert_eq!(config.lock_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = Config {
            multiply_step: Bounds::new(6, 2),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("multiply_step"));
    }

    #[test]
    fn test_rejects_negative_period() {
        let config = Config::default().with_jitter_ms(Bounds::new(-1, 10));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_steps_are_allowed() {
        let config = Config {
            increment_step: Bounds::new(-5, -1),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = Config::default().with_channel_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_tick() {
        let config = Config {
            tick_us: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(2, 6);
        assert!(bounds.contains(2));
        assert!(bounds.contains(6));
        assert!(!bounds.contains(1));
        assert!(!bounds.contains(7));
        assert_eq!(bounds.to_string(), "2..=6");
    }

    #[test]
    fn test_seeds_from_base_are_distinct() {
        let seeds = Seeds::from_base(10);
        assert_eq!(seeds.jitter, 10);
        assert_eq!(seeds.resetter, 13);
        assert_ne!(seeds.incrementer, seeds.multiplier);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_partial() {
        let config =
            Config::from_json_str(r#"{"channel_capacity": 8, "jitter_ms": {"low": 1, "high": 2}}"#)
                .unwrap();
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.jitter_ms, Bounds::new(1, 2));
        assert_eq!(config.lock_timeout_ticks, DEFAULT_LOCK_TIMEOUT_TICKS);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_rejects_invalid() {
        let result = Config::from_json_str(r#"{"channel_capacity": 0}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_from_json_syntax_error() {
        let result = Config::from_json_str("{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
