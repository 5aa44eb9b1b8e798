//! Cooperative wake-cycle scheduler
//!
//! One pass per wake decides which periodic work is due, runs it in order
//! (connectivity, poll, motion) and reports what happened.

pub mod cycle;
pub mod interval;
pub mod report;

pub use cycle::{Peripherals, Scheduler};
pub use interval::Interval;
pub use report::{DiagnosticsReport, MotionReport, PollReport, WakeReport};
