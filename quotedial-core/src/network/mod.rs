//! Network-facing stages of a wake cycle
//!
//! The guard brings the Wi-Fi link up before any poll; the source performs
//! exactly one quote request per call and classifies every failure.

pub mod guard;
pub mod source;

pub use guard::ConnectivityGuard;
pub use source::{PollFailure, ValueSource, BODY_CAPACITY};
