//! Clears the shared counter every few seconds.
//!
//! The old value is taken with `read_and_clear()` and the new value with a
//! separate `read()`. The two calls are not atomic as a pair: a producer
//! that runs in between makes the reported new value non-zero.

use std::time::Duration;

use crate::channel::EventRecord;
use crate::config::{Bounds, Config};
use crate::random::StepRng;
use crate::tasks::{PeriodicTask, Priority, TaskContext};

/// Periodically resets the shared counter and reports
/// `"Resetting from <old> to ... <new>"`.
///
/// The period is drawn in whole seconds from a private generator, not from
/// the shared jitter source.
#[derive(Debug)]
pub struct Resetter {
    ctx: TaskContext,
    periods: StepRng,
    period_secs: Bounds,
}

impl Resetter {
    /// Creates a Resetter over the shared resources in `ctx`.
    pub fn new(ctx: TaskContext, config: &Config) -> Self {
        Self {
            ctx,
            periods: StepRng::new(config.seeds.resetter),
            period_secs: config.reset_period_secs,
        }
    }
}

impl PeriodicTask for Resetter {
    const NAME: &'static str = "reset-task";
    const PRIORITY: Priority = Priority::Normal;

    fn next_period(&mut self) -> Duration {
        let secs = self.periods.next(self.period_secs.low, self.period_secs.high);
        Duration::from_secs(u64::try_from(secs).unwrap_or(0))
    }

    fn run_once(&mut self) {
        let old = self.ctx.counter.read_and_clear();
        let new = self.ctx.counter.read();
        self.ctx.channel.try_send(EventRecord::format(format_args!(
            "Resetting from {old} to ... {new}"
        )));
    }
}
