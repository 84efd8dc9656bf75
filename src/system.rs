//! Bootstrap: builds the shared resources and spawns the four tasks.
//!
//! [`System::new`] validates a [`Config`] and creates the counter, the
//! shared jitter source and the event channel. [`System::spawn`] starts the
//! display, resetter, incrementer and multiplier tasks (in that order), each
//! on its own named thread, and returns a [`SystemHandle`].
//!
//! The handle either waits forever ([`SystemHandle::join`], the default
//! behaviour of the binary) or cancels the tasks at their next
//! sleep-until-deadline and joins them ([`SystemHandle::shutdown`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use periodici::{Config, System};
//!
//! # fn main() -> periodici::Result<()> {
//! let system = System::new(Config::default())?;
//! let handle = system.spawn(std::io::stdout())?;
//! handle.join()?; // runs forever
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::schedule::CancelToken;
use crate::stats::StatsSnapshot;
use crate::tasks::{
    run_periodic, Display, Incrementer, Multiplier, PeriodicTask, Resetter, TaskContext,
};

/// The shared resources of a task set, ready to be spawned.
#[derive(Debug)]
pub struct System {
    config: Config,
    ctx: TaskContext,
}

impl System {
    /// Validates `config` and creates the shared resources.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let ctx = TaskContext::from_config(&config);
        Ok(Self { config, ctx })
    }

    /// The configuration the system was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared resources.
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Spawns all four tasks, with the display writing to `out`.
    ///
    /// If a later task fails to spawn, the tasks already running are
    /// cancelled and joined before the error is returned.
    pub fn spawn<W>(self, out: W) -> Result<SystemHandle>
    where
        W: Write + Send + 'static,
    {
        let mut handle = SystemHandle {
            cancel: CancelToken::new(),
            ctx: self.ctx.clone(),
            tasks: Vec::with_capacity(4),
        };

        let display = Display::new(&self.ctx, &self.config, out);
        let resetter = Resetter::new(self.ctx.clone(), &self.config);
        let incrementer = Incrementer::new(self.ctx.clone(), &self.config);
        let multiplier = Multiplier::new(self.ctx.clone(), &self.config);

        let spawned = handle
            .start(display)
            .and_then(|()| handle.start(resetter))
            .and_then(|()| handle.start(incrementer))
            .and_then(|()| handle.start(multiplier));

        if let Err(e) = spawned {
            // The partial task set is torn down before reporting.
            let _ = handle.shutdown();
            return Err(e);
        }

        info!(
            tasks = handle.tasks.len(),
            channel_capacity = self.config.channel_capacity,
            lock_timeout = ?self.config.lock_timeout(),
            "system started"
        );
        Ok(handle)
    }
}

/// Handle to a running task set.
#[derive(Debug)]
pub struct SystemHandle {
    cancel: CancelToken,
    ctx: TaskContext,
    tasks: Vec<(&'static str, JoinHandle<u64>)>,
}

impl SystemHandle {
    fn start<T>(&mut self, task: T) -> Result<()>
    where
        T: PeriodicTask + 'static,
    {
        let cancel = self.cancel.clone();
        let join = thread::Builder::new()
            .name(T::NAME.to_string())
            .spawn(move || run_periodic(task, &cancel))
            .map_err(|source| Error::Spawn {
                name: T::NAME,
                source,
            })?;

        info!(task = T::NAME, priority = %T::PRIORITY, "task spawned");
        self.tasks.push((T::NAME, join));
        Ok(())
    }

    /// Names of the running tasks, in spawn order.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    /// The shared resources the tasks operate on.
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// A token that stops every task when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Captures the current tallies of the system.
    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.ctx.channel.stats();
        StatsSnapshot {
            timestamp_ms: None,
            counter_value: self.ctx.counter.try_read().ok(),
            counter_lock_timeouts: self.ctx.counter.lock_timeouts(),
            records_sent: stats.sent(),
            records_dropped: stats.dropped(),
            records_received: stats.received(),
            records_pending: self.ctx.channel.len(),
        }
    }

    /// Waits for every task to finish.
    ///
    /// Tasks only finish once the [`cancel_token`](Self::cancel_token) is
    /// cancelled, so without one this never returns.
    pub fn join(self) -> Result<()> {
        let mut first_panic = None;
        for (name, join) in self.tasks {
            match join.join() {
                Ok(cycles) => debug!(task = name, cycles, "task joined"),
                Err(_) => {
                    first_panic.get_or_insert(name);
                }
            }
        }
        match first_panic {
            Some(name) => Err(Error::TaskPanicked(name)),
            None => Ok(()),
        }
    }

    /// Cancels every task at its next sleep and waits for them to finish.
    pub fn shutdown(self) -> Result<()> {
        info!("shutting down");
        self.cancel.cancel();
        self.join()
    }
}
