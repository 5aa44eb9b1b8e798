//! Servo motion
//!
//! Movements are broken into small pulse steps driven by a cooperative
//! step function, so the caller can feed the watchdog and simulate time.

pub mod calibration;
pub mod controller;
pub mod profile;

pub use calibration::{CalibrationError, CalibrationSweep, Waypoint, MAX_WAYPOINTS};
pub use controller::{
    MotionController, MotionError, MotionOutcome, MotionPoll, MotionRequest, MotionState,
};
pub use profile::MotionProfile;
