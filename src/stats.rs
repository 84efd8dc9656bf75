//! Tallies of what the task set did while it ran.
//!
//! The running system never reports a dropped record or a lock timeout on
//! its output stream. These counters make both visible after the fact
//! without adding anything to the hot path beyond a relaxed atomic add.
//!
//! Each tally is cache-line padded, so producers bumping `sent` do not
//! bounce the line the display task uses for `received`.
//!
//! A [`StatsSnapshot`] captures every tally at one point in time. With the
//! `serde` feature it is serializable, and with the `json` feature it can be
//! rendered with [`StatsSnapshot::to_json`].

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_utils::CachePadded;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Send, drop and receive tallies of an [`EventChannel`](crate::channel::EventChannel).
pub struct ChannelStats {
    sent: CachePadded<AtomicU64>,
    dropped: CachePadded<AtomicU64>,
    received: CachePadded<AtomicU64>,
}

impl ChannelStats {
    /// Creates a zeroed set of tallies.
    pub const fn new() -> Self {
        Self {
            sent: CachePadded::new(AtomicU64::new(0)),
            dropped: CachePadded::new(AtomicU64::new(0)),
            received: CachePadded::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records accepted by the channel.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Records dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Records taken out of the channel.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ChannelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelStats")
            .field("sent", &self.sent())
            .field("dropped", &self.dropped())
            .field("received", &self.received())
            .finish()
    }
}

/// A point-in-time capture of the whole system.
///
/// # Examples
///
/// ```rust
/// use periodici::stats::StatsSnapshot;
///
/// let snapshot = StatsSnapshot::default();
/// assert_eq!(snapshot.records_dropped, 0);
/// assert!(snapshot.timestamp_ms.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsSnapshot {
    /// Milliseconds since the Unix epoch when the snapshot was taken.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp_ms: Option<u64>,
    /// Counter value, or `None` if its lock was busy.
    pub counter_value: Option<i32>,
    /// Counter operations skipped on lock timeout.
    pub counter_lock_timeouts: u64,
    /// Records accepted by the channel.
    pub records_sent: u64,
    /// Records dropped on a full channel.
    pub records_dropped: u64,
    /// Records drained by the display task.
    pub records_received: u64,
    /// Records still queued.
    pub records_pending: usize,
}

impl StatsSnapshot {
    /// Stamps the snapshot with the current wall-clock time.
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp_ms = Some(current_timestamp_ms());
        self
    }

    /// Serializes the snapshot to JSON.
    #[cfg(feature = "json")]
    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
