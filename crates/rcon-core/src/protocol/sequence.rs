//! Sequence counter for outbound `Command` packets.
//!
//! The counter is a single byte on the wire, so it wraps from 255 back to 0.
//! It is owned by one session rather than shared process-wide, which keeps
//! sessions independent of each other and lets tests pick a starting value.
//!
//! Server notices carry their own, unrelated sequence numbers; those are only
//! echoed back in acknowledgements and never touch this counter.

/// A wrapping `u8` counter for command sequence numbers.
///
/// # Examples
///
/// ```rust
/// use rcon_core::protocol::SequenceCounter;
///
/// let mut counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u8,
}

impl SequenceCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Creates a counter whose first [`next`](Self::next) returns `value`.
    pub fn starting_at(value: u8) -> Self {
        Self { next: value }
    }

    /// Returns the next sequence number and advances the counter.
    ///
    /// Wraps around from 255 to 0 without panicking.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u8 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }

    /// Returns the value the next call to [`next`](Self::next) will hand out.
    pub fn current(&self) -> u8 {
        self.next
    }
}
