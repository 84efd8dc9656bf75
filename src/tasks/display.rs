//! The single consumer of the event channel.
//!
//! Each cycle drains every record currently queued, writes them one per
//! line in arrival order, then writes a blank separator line and flushes.
//! Unlike the producers, the display works once before its first sleep.
//!
//! ```text
//!   Incremented by 3 to ... 3
//!   Multiplied by 4 to ... 12
//!   <blank>
//!   <blank>                      (a cycle that found nothing)
//!   Resetting from 12 to ... 0
//!   <blank>
//! ```
//!
//! A failing sink does not stop the task: the channel is still drained, the
//! failure is logged and the next cycle tries again.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::channel::EventChannel;
use crate::config::{Bounds, Config};
use crate::random::SharedRandom;
use crate::tasks::{jitter_period, PeriodicTask, Priority, TaskContext};

/// Drains the event channel into a line-oriented sink.
pub struct Display<W> {
    channel: Arc<EventChannel>,
    jitter: Arc<SharedRandom>,
    period_ms: Bounds,
    out: W,
    write_failures: u64,
}

impl<W: Write + Send> Display<W> {
    /// Creates a display that writes to `out`.
    pub fn new(ctx: &TaskContext, config: &Config, out: W) -> Self {
        Self {
            channel: Arc::clone(&ctx.channel),
            jitter: Arc::clone(&ctx.jitter),
            period_ms: config.jitter_ms,
            out,
            write_failures: 0,
        }
    }

    /// Number of cycles in which the sink reported an error.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Consumes the display and returns its sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Drains the channel and writes every record, returning how many
    /// records were drained and the first sink error, if any.
    fn render(&mut self) -> (usize, Option<io::Error>) {
        let mut drained = 0;
        let mut failure = None;

        for record in self.channel.drain() {
            drained += 1;
            if let Err(e) = writeln!(self.out, "{record}") {
                failure.get_or_insert(e);
            }
        }

        if let Err(e) = writeln!(self.out).and_then(|()| self.out.flush()) {
            failure.get_or_insert(e);
        }

        (drained, failure)
    }
}

impl<W: Write + Send> PeriodicTask for Display<W> {
    const NAME: &'static str = "display-task";
    const PRIORITY: Priority = Priority::Normal;
    const WORK_FIRST: bool = true;

    fn next_period(&mut self) -> Duration {
        jitter_period(&self.jitter, self.period_ms)
    }

    fn run_once(&mut self) {
        let (drained, failure) = self.render();
        if let Some(error) = failure {
            self.write_failures += 1;
            warn!(task = Self::NAME, drained, %error, "failed to write records");
        }
    }
}
