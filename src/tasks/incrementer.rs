//! Adds a random step to the shared counter on every cycle.

use std::time::Duration;

use crate::channel::EventRecord;
use crate::config::{Bounds, Config};
use crate::random::StepRng;
use crate::tasks::{jitter_period, PeriodicTask, Priority, TaskContext};

/// Periodically increments the shared counter by a small random step and
/// reports `"Incremented by <step> to ... <value>"`.
///
/// The step comes from a private generator; the period comes from the
/// shared jitter source.
#[derive(Debug)]
pub struct Incrementer {
    ctx: TaskContext,
    steps: StepRng,
    step_bounds: Bounds,
    period_ms: Bounds,
}

impl Incrementer {
    /// Creates an Incrementer over the shared resources in `ctx`.
    pub fn new(ctx: TaskContext, config: &Config) -> Self {
        Self {
            ctx,
            steps: StepRng::new(config.seeds.incrementer),
            step_bounds: config.increment_step,
            period_ms: config.jitter_ms,
        }
    }
}

impl PeriodicTask for Incrementer {
    const NAME: &'static str = "increment-task";
    const PRIORITY: Priority = Priority::High;

    fn next_period(&mut self) -> Duration {
        jitter_period(&self.ctx.jitter, self.period_ms)
    }

    fn run_once(&mut self) {
        let step = self.steps.next(self.step_bounds.low, self.step_bounds.high);
        let value = self.ctx.counter.increment(step);
        self.ctx.channel.try_send(EventRecord::format(format_args!(
            "Incremented by {step} to ... {value}"
        )));
    }
}
