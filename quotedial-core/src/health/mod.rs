//! Health tracking
//!
//! Records what the dial has done since boot. Everything resets on reboot,
//! including a watchdog reset.

pub mod message;
pub mod tracker;

pub use message::BoundedMessage;
pub use tracker::{ErrorMessage, HealthTracker, MESSAGE_CAPACITY};
