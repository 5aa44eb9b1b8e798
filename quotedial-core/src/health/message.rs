//! Fixed-capacity message buffer
//!
//! Error text is formatted straight into a bounded buffer. Writes past the
//! capacity are dropped at a character boundary and flagged; formatting
//! never fails and never allocates.

use core::fmt::{self, Write};

use heapless::String;

/// A message that never exceeds `N` bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoundedMessage<const N: usize> {
    text: String<N>,
    truncated: bool,
}

impl<const N: usize> BoundedMessage<N> {
    /// Create an empty message
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            truncated: false,
        }
    }

    /// Message text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if no message is stored
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if the last write was cut short
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Maximum length in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Clear the message
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// Replace the message with formatted text
    pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.clear();
        // write_str never errors; overflow is recorded in `truncated`
        let _ = self.write_fmt(args);
    }

    /// Replace the message with a displayable value
    pub fn set<D: fmt::Display + ?Sized>(&mut self, value: &D) {
        self.set_fmt(format_args!("{}", value));
    }

    /// Check if the message contains a pattern
    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }
}

impl<const N: usize> Write for BoundedMessage<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for ch in s.chars() {
            if self.text.push(ch).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Display for BoundedMessage<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
