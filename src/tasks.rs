//! The periodic tasks and the loop that drives them.
//!
//! Every task implements [`PeriodicTask`]: it knows how long its next period
//! is and what one unit of work looks like. [`run_periodic`] supplies the
//! rest, a private [`PeriodicTimer`] and a sleep on the system's
//! [`CancelToken`] between cycles.
//!
//! | Task | Priority | Period | Work |
//! |------|----------|--------|------|
//! | [`Incrementer`] | High | shared jitter, ms | `increment(step)` |
//! | [`Multiplier`] | High | shared jitter, ms | `multiply(step)` |
//! | [`Resetter`] | Normal | private draw, whole seconds | `read_and_clear()` then `read()` |
//! | [`Display`] | Normal | shared jitter, ms | drain channel to the sink |
//!
//! Shared resources reach the tasks through a [`TaskContext`] rather than
//! globals.

pub mod display;
pub mod incrementer;
pub mod multiplier;
pub mod resetter;

pub use display::Display;
pub use incrementer::Incrementer;
pub use multiplier::Multiplier;
pub use resetter::Resetter;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::channel::EventChannel;
use crate::config::{Bounds, Config};
use crate::counter::SharedCounter;
use crate::random::SharedRandom;
use crate::schedule::{CancelToken, PeriodicTimer};

/// Relative priority of a task.
///
/// Host threads have no portable priority control, so this is carried as
/// metadata and reported when a task is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Display and Resetter.
    Normal,
    /// Incrementer and Multiplier.
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => f.write_str("normal"),
            Priority::High => f.write_str("high"),
        }
    }
}

/// Shared resources handed to every task at construction.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// The counter mutated by the producers.
    pub counter: Arc<SharedCounter>,
    /// The jitter source shared by every task.
    pub jitter: Arc<SharedRandom>,
    /// The channel from the producers to the display.
    pub channel: Arc<EventChannel>,
}

impl TaskContext {
    /// Builds fresh shared resources from `config`.
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.lock_timeout();
        Self {
            counter: Arc::new(SharedCounter::new(timeout).with_name("counter")),
            jitter: Arc::new(SharedRandom::new(
                config.seeds.jitter,
                timeout,
                config.jitter_fallback_ms,
            )),
            channel: Arc::new(EventChannel::new(config.channel_capacity)),
        }
    }
}

/// One independently scheduled unit of work.
pub trait PeriodicTask: Send {
    /// Thread name of the task.
    const NAME: &'static str;

    /// Relative priority of the task.
    const PRIORITY: Priority;

    /// Whether the task works once before its first sleep.
    const WORK_FIRST: bool = false;

    /// Draws the length of the next period.
    fn next_period(&mut self) -> Duration;

    /// Performs one cycle of work.
    fn run_once(&mut self);
}

/// Runs `task` until `cancel` is cancelled and returns the number of
/// periods it scheduled, including the one cut short by the cancellation.
///
/// Each deadline is the previous deadline plus a freshly drawn period.
pub fn run_periodic<T: PeriodicTask>(mut task: T, cancel: &CancelToken) -> u64 {
    let mut timer = PeriodicTimer::start();
    debug!(task = T::NAME, priority = %T::PRIORITY, "task started");

    if T::WORK_FIRST && !cancel.is_cancelled() {
        task.run_once();
    }

    loop {
        let deadline = timer.advance(task.next_period());
        if !cancel.sleep_until(deadline) {
            break;
        }
        task.run_once();
    }

    debug!(task = T::NAME, cycles = timer.cycles(), "task stopped");
    timer.cycles()
}

/// Draws a period in milliseconds from the shared jitter source.
pub(crate) fn jitter_period(jitter: &SharedRandom, bounds: Bounds) -> Duration {
    let ms = jitter.next(bounds.low, bounds.high);
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}
