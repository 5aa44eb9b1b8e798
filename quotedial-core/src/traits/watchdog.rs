//! Hardware watchdog trait

/// Trait for a hardware watchdog
///
/// If `feed` is not called within `timeout_ms` the board resets.
pub trait Watchdog {
    /// Restart the watchdog countdown
    fn feed(&mut self);

    /// Reset window in milliseconds
    fn timeout_ms(&self) -> u32;
}
