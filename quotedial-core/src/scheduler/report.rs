//! Wake cycle reports
//!
//! The core never logs. Each wake returns a report describing what ran so
//! the firmware can log it.

use core::fmt;

use crate::error::ErrorKind;
use crate::health::{ErrorMessage, HealthTracker};

/// Outcome of the poll stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollReport {
    /// Price accepted and mapped
    Accepted { value: f32, raw: f32, command: u16 },
    /// Poll failed; details are in the health tracker
    Failed(ErrorKind),
    /// Poll was due but the link was down
    LinkDown,
}

/// Outcome of the motion stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionReport {
    /// Inside the dead band
    Skipped,
    /// Dial moved
    Completed { command: u16, steps: u32 },
    /// Startup sweep finished
    Calibrated,
    /// Servo fault; details are in the health tracker
    Failed(ErrorKind),
}

/// Periodic health snapshot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagnosticsReport {
    pub uptime_ms: u64,
    /// Free memory in bytes, when the platform reports it
    pub free_memory: Option<u32>,
    pub successful_requests: u32,
    pub failed_requests: u32,
    pub connectivity_failures: u32,
    pub motions_completed: u32,
    pub last_value: Option<f32>,
    pub last_error: ErrorMessage,
    pub actuator_attached: bool,
}

impl DiagnosticsReport {
    /// Snapshot the tracker at `now_ms`
    pub fn capture(health: &HealthTracker, now_ms: u64, free_memory: Option<u32>) -> Self {
        Self {
            uptime_ms: health.uptime_ms(now_ms),
            free_memory,
            successful_requests: health.successful_requests(),
            failed_requests: health.failed_requests(),
            connectivity_failures: health.connectivity_failures(),
            motions_completed: health.motions_completed(),
            last_value: health.last_accepted_value(),
            last_error: health.last_error().clone(),
            actuator_attached: health.actuator_attached(),
        }
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uptime {} s, free ", self.uptime_ms / 1000)?;
        match self.free_memory {
            Some(bytes) => write!(f, "{} B", bytes)?,
            None => f.write_str("n/a")?,
        }
        write!(
            f,
            ", requests {} ok / {} failed, link failures {}, moves {}, last value ",
            self.successful_requests,
            self.failed_requests,
            self.connectivity_failures,
            self.motions_completed
        )?;
        match self.last_value {
            Some(value) => write!(f, "{:.2}", value)?,
            None => f.write_str("none")?,
        }
        if !self.last_error.is_empty() {
            write!(f, ", last error: {}", self.last_error)?;
        }
        Ok(())
    }
}

/// Everything that happened in one wake
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeReport {
    /// Uptime at the start of the wake
    pub now_ms: u64,
    /// Link check result, if one ran
    pub link: Option<bool>,
    pub poll: Option<PollReport>,
    pub motion: Option<MotionReport>,
    pub diagnostics: Option<DiagnosticsReport>,
}

impl WakeReport {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            link: None,
            poll: None,
            motion: None,
            diagnostics: None,
        }
    }

    /// Check if nothing was due
    pub fn is_idle(&self) -> bool {
        self.link.is_none()
            && self.poll.is_none()
            && self.motion.is_none()
            && self.diagnostics.is_none()
    }
}
