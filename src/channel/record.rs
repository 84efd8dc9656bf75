//! Fixed-capacity text records.
//!
//! An [`EventRecord`] is a 64-byte inline buffer, so records can move
//! through the channel by value without allocating. One byte is reserved
//! for the terminator of the serial-port format, which leaves
//! [`EventRecord::MAX_LEN`] = 63 bytes of text. Longer text is silently cut
//! at the last UTF-8 character boundary that fits.

use std::fmt::{self, Debug, Display, Write};

/// Size in bytes of one record slot, terminator included.
pub const RECORD_CAPACITY: usize = 64;

/// A bounded, truncating text buffer.
///
/// # Examples
///
/// ```rust
/// use periodici::channel::EventRecord;
///
/// let record = EventRecord::format(format_args!("Incremented by {} to ... {}", 3, 3));
/// assert_eq!(record.as_str(), "Incremented by 3 to ... 3");
///
/// let long = EventRecord::from_text(&"x".repeat(100));
/// assert_eq!(long.len(), EventRecord::MAX_LEN);
/// assert!(long.is_truncated());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    buf: [u8; RECORD_CAPACITY],
    len: u8,
    truncated: bool,
}

impl EventRecord {
    /// Maximum number of text bytes a record can hold.
    pub const MAX_LEN: usize = RECORD_CAPACITY - 1;

    /// Creates an empty record.
    pub const fn new() -> Self {
        Self {
            buf: [0; RECORD_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    /// Creates a record from formatting arguments, truncating on overflow.
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        let mut record = Self::new();
        // write_str never fails; overflow only sets the truncation flag.
        let _ = record.write_fmt(args);
        record
    }

    /// Creates a record holding a copy of `text`, truncating on overflow.
    pub fn from_text(text: &str) -> Self {
        let mut record = Self::new();
        record.push_str(text);
        record
    }

    /// Returns the text of the record.
    pub fn as_str(&self) -> &str {
        // Only whole characters are ever copied in.
        std::str::from_utf8(&self.buf[..self.len()]).unwrap_or_default()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns `true` if the record holds no text.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if some text did not fit and was dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn push_str(&mut self, s: &str) {
        if self.truncated {
            return;
        }
        let room = Self::MAX_LEN - self.len();
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        let start = self.len();
        self.buf[start..start + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take as u8;
        if take < s.len() {
            self.truncated = true;
        }
    }
}

impl Write for EventRecord {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl Default for EventRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventRecord({:?}", self.as_str())?;
        if self.truncated {
            write!(f, ", truncated")?;
        }
        write!(f, ")")
    }
}
