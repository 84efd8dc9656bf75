//! # Periodici - Jittered Periodic Tasks over a Shared Counter
//!
//! A small real-time task set: several periodic producers mutate one shared
//! counter and report what they did through a bounded channel, and a single
//! consumer drains the channel to a line-oriented sink.
//!
//! ## The Pattern
//!
//! ```text
//!                       ┌──────────────────────────┐
//!                       │  SharedRandom (jitter)   │◄── TimedLock, fallback 100
//!                       └────────────┬─────────────┘
//!                                    │ periods
//!          ┌─────────────────┬───────┴─────────┬──────────────────┐
//!          ▼                 ▼                 ▼                  ▼
//!   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//!   │ Incrementer │   │ Multiplier  │   │  Resetter   │   │   Display    │
//!   │  +step 1..5 │   │  ×step 2..6 │   │ every 5..15s│   │ drain + "\n" │
//!   └──────┬──────┘   └──────┬──────┘   └──────┬──────┘   └──────▲───────┘
//!          │    ┌────────────┴─────────────────┤                 │
//!          ├───►│ SharedCounter (TimedLock<i32>)                 │
//!          │    └──────────────────────────────┘                 │
//!          │ try_send          │ try_send      │ try_send        │ try_receive
//!          └───────────────────┴───────────────┴──►  EventChannel ┘
//!                                              (512 × 64-byte records,
//!                                               drop on overflow)
//! ```
//!
//! ### Design Principles
//!
//! 1. **Degrade, never block forever**: every lock is taken with a bounded
//!    wait (100 ticks by default). On timeout the counter returns `0` and
//!    the jitter source returns its fallback, and the task carries on. The
//!    `try_` variants expose the timeout for callers that need to tell it
//!    apart.
//!
//! 2. **Bounded, lossy buffering**: the channel never blocks a producer. A
//!    record that does not fit is dropped; drops are tallied in
//!    [`ChannelStats`](stats::ChannelStats) and never printed.
//!
//! 3. **Drift-free periods**: each task computes its next deadline from the
//!    previous deadline plus a jittered period, never from "now".
//!
//! 4. **Injected, not global**: the shared resources live in a
//!    [`TaskContext`](tasks::TaskContext) of `Arc`s handed to every task.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use periodici::config::{Bounds, Config};
//! use periodici::System;
//!
//! # fn main() -> periodici::Result<()> {
//! let config = Config::default().with_jitter_ms(Bounds::new(1, 5));
//! let handle = System::new(config)?.spawn(std::io::sink())?;
//!
//! std::thread::sleep(Duration::from_millis(50));
//! let stats = handle.snapshot();
//! handle.shutdown()?;
//!
//! assert!(stats.records_sent > 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Format
//!
//! One record per line, then a blank line per display cycle:
//!
//! ```text
//! Incremented by 3 to ... 3
//! Multiplied by 4 to ... 12
//!
//! Resetting from 12 to ... 0
//!
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for [`Config`] and [`StatsSnapshot`](stats::StatsSnapshot) |
//! | `json` | JSON config loading and [`StatsSnapshot::to_json`](stats::StatsSnapshot) |
//! | `full` | All of the above |
//! | `demo` | The `periodici-demo` binary (pulls in `clap`) |

pub mod channel;
pub mod config;
pub mod counter;
pub mod error;
pub mod lock;
pub mod random;
pub mod schedule;
pub mod stats;
pub mod system;
pub mod tasks;

pub use channel::{EventChannel, EventRecord};
pub use config::Config;
pub use counter::SharedCounter;
pub use error::{Error, Result};
pub use system::{System, SystemHandle};

/// Installs the `tracing` subscriber used by the binaries.
///
/// Logs go to stderr so that stdout carries only the record stream. The
/// filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
