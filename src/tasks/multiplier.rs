//! Multiplies the shared counter by a random factor on every cycle.

use std::time::Duration;

use crate::channel::EventRecord;
use crate::config::{Bounds, Config};
use crate::random::StepRng;
use crate::tasks::{jitter_period, PeriodicTask, Priority, TaskContext};

/// Periodically multiplies the shared counter by a small random factor and
/// reports `"Multiplied by <step> to ... <value>"`.
#[derive(Debug)]
pub struct Multiplier {
    ctx: TaskContext,
    steps: StepRng,
    step_bounds: Bounds,
    period_ms: Bounds,
}

impl Multiplier {
    /// Creates a Multiplier over the shared resources in `ctx`.
    pub fn new(ctx: TaskContext, config: &Config) -> Self {
        Self {
            ctx,
            steps: StepRng::new(config.seeds.multiplier),
            step_bounds: config.multiply_step,
            period_ms: config.jitter_ms,
        }
    }
}

impl PeriodicTask for Multiplier {
    const NAME: &'static str = "multiply-task";
    const PRIORITY: Priority = Priority::High;

    fn next_period(&mut self) -> Duration {
        jitter_period(&self.ctx.jitter, self.period_ms)
    }

    fn run_once(&mut self) {
        let step = self.steps.next(self.step_bounds.low, self.step_bounds.high);
        let value = self.ctx.counter.multiply(step);
        self.ctx.channel.try_send(EventRecord::format(format_args!(
            "Multiplied by {step} to ... {value}"
        )));
    }
}
