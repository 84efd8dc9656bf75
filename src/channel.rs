//! Bounded event channel between the producer tasks and the display.
//!
//! [`EventChannel`] is a fixed-capacity FIFO of [`EventRecord`]s backed by
//! a lock-free [`ArrayQueue`]. Neither side ever blocks:
//!
//! - [`try_send`](EventChannel::try_send) drops the record and returns
//!   `false` when every slot is taken. Dropping is silent; it only shows up
//!   in [`ChannelStats::dropped`].
//! - [`try_receive`](EventChannel::try_receive) returns `None` when no
//!   record is waiting, which is the normal end of a drain.
//!
//! ```text
//!   Incrementer ──try_send──►┐
//!   Multiplier  ──try_send──►├──► [ r0 | r1 | ... | r511 ] ──try_receive──► Display
//!   Resetter    ──try_send──►┘        (full: new record dropped)
//! ```
//!
//! Records from different producers interleave in arrival order; records
//! from a single producer keep their order.

mod record;

pub use record::{EventRecord, RECORD_CAPACITY};

use std::fmt::{self, Debug};

use crossbeam_queue::ArrayQueue;

use crate::config::DEFAULT_CHANNEL_CAPACITY;
use crate::stats::ChannelStats;

/// A bounded multi-producer queue of event records that drops on overflow.
///
/// # Examples
///
/// ```rust
/// use periodici::channel::{EventChannel, EventRecord};
///
/// let channel = EventChannel::new(2);
/// assert!(channel.try_send(EventRecord::from_text("a")));
/// assert!(channel.try_send(EventRecord::from_text("b")));
/// assert!(!channel.try_send(EventRecord::from_text("c"))); // full, dropped
///
/// let drained: Vec<String> = channel.drain().map(|r| r.to_string()).collect();
/// assert_eq!(drained, ["a", "b"]);
/// assert_eq!(channel.stats().dropped(), 1);
/// ```
pub struct EventChannel {
    queue: ArrayQueue<EventRecord>,
    stats: ChannelStats,
}

impl EventChannel {
    /// Creates a channel with room for `capacity` records.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            stats: ChannelStats::new(),
        }
    }

    /// Enqueues `record` without blocking.
    ///
    /// Returns `false` and drops the record if the channel is full; the
    /// records already queued are left untouched.
    #[inline]
    pub fn try_send(&self, record: EventRecord) -> bool {
        match self.queue.push(record) {
            Ok(()) => {
                self.stats.record_sent();
                true
            }
            Err(_) => {
                self.stats.record_dropped();
                false
            }
        }
    }

    /// Dequeues the oldest record without blocking.
    #[inline]
    pub fn try_receive(&self) -> Option<EventRecord> {
        let record = self.queue.pop();
        if record.is_some() {
            self.stats.record_received();
        }
        record
    }

    /// Returns an iterator that receives records until the channel is
    /// empty.
    ///
    /// Records sent while the drain is in progress may or may not be
    /// included.
    pub fn drain(&self) -> impl Iterator<Item = EventRecord> + '_ {
        std::iter::from_fn(move || self.try_receive())
    }

    /// Number of records currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no record is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns `true` if every slot is taken.
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Number of record slots.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Send, drop and receive tallies.
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn record(i: usize) -> EventRecord {
        EventRecord::format(format_args!("record {i}"))
    }

    #[test]
    fn test_empty_receive_is_none() {
        let channel = EventChannel::new(4);
        assert!(channel.is_empty());
        assert_eq!(channel.try_receive(), None);
        assert_eq!(channel.stats().received(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let channel = EventChannel::new(8);
        for text in ["R1", "R2", "R3"] {
            assert!(channel.try_send(EventRecord::from_text(text)));
        }
        let drained: Vec<String> = channel.drain().map(|r| r.to_string()).collect();
        assert_eq!(drained, ["R1", "R2", "R3"]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_full_channel_rejects_and_keeps_contents() {
        let channel = EventChannel::new(3);
        for i in 0..3 {
            assert!(channel.try_send(record(i)));
        }
        assert!(channel.is_full());

        assert!(!channel.try_send(record(99)));
        assert_eq!(channel.len(), 3);

        let drained: Vec<EventRecord> = channel.drain().collect();
        assert_eq!(drained, vec![record(0), record(1), record(2)]);
    }

    #[test]
    fn test_513_into_512() {
        let channel = EventChannel::default();
        assert_eq!(channel.capacity(), 512);

        for i in 0..512 {
            assert!(channel.try_send(record(i)), "send {i} failed");
        }
        assert!(!channel.try_send(record(512)));

        let drained: Vec<EventRecord> = channel.drain().collect();
        assert_eq!(drained.len(), 512);
        for (i, r) in drained.iter().enumerate() {
            assert_eq!(*r, record(i));
        }

        assert_eq!(channel.stats().sent(), 512);
        assert_eq!(channel.stats().dropped(), 1);
        assert_eq!(channel.stats().received(), 512);
    }

    #[test]
    fn test_space_frees_after_receive() {
        let channel = EventChannel::new(1);
        assert!(channel.try_send(record(0)));
        assert!(!channel.try_send(record(1)));
        assert_eq!(channel.try_receive(), Some(record(0)));
        assert!(channel.try_send(record(2)));
    }

    #[test]
    fn test_multiple_producers() {
        let channel = Arc::new(EventChannel::new(1024));
        let mut handles = vec![];

        for p in 0..3 {
            let channel = Arc::clone(&channel);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    channel.try_send(EventRecord::format(format_args!("{p}:{i}")));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let drained: Vec<String> = channel.drain().map(|r| r.to_string()).collect();
        assert_eq!(drained.len(), 300);

        // Per-producer order survives interleaving.
        for p in 0..3 {
            let prefix = format!("{p}:");
            let seq: Vec<usize> = drained
                .iter()
                .filter_map(|s| s.strip_prefix(&prefix))
                .map(|s| s.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_overflow_under_contention_never_exceeds_capacity() {
        let channel = Arc::new(EventChannel::new(16));
        let mut handles = vec![];

        for _ in 0..4 {
            let channel = Arc::clone(&channel);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    channel.try_send(record(i));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(channel.len(), 16);
        assert_eq!(channel.stats().sent(), 16);
        assert_eq!(channel.stats().dropped(), 384);
    }
}
