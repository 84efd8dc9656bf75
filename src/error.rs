//! Unified error type for setting up and tearing down a task set.
//!
//! Nothing that happens while the tasks are running is an error: lock
//! timeouts degrade to sentinel values and a full channel drops records.
//! The variants here cover the edges of the system instead, i.e. building
//! a [`Config`](crate::config::Config), spawning the task threads and
//! joining them again.
//!
//! # Example
//!
//! ```rust
//! use periodici::{Config, Error, Result};
//!
//! fn build() -> Result<Config> {
//!     let config = Config::default().with_channel_capacity(0);
//!     config.validate()?;
//!     Ok(config)
//! }
//!
//! assert!(matches!(build(), Err(Error::InvalidConfig(_))));
//! ```

use thiserror::Error;

/// Unified error type for all fallible setup operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A task thread could not be spawned.
    #[error("failed to spawn task `{name}`: {source}")]
    Spawn {
        /// Name of the task that failed to start.
        name: &'static str,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A task thread panicked before it could be joined.
    #[error("task `{0}` panicked")]
    TaskPanicked(&'static str),

    /// Error reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing or producing JSON.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for setup operations.
pub type Result<T> = std::result::Result<T, Error>;
