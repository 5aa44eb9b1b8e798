//! Startup configuration checks
//!
//! A dial with a broken configuration must stop before it polls or moves.
//! Every fixed blocking wait is also checked against the watchdog window,
//! since a single wait longer than the window resets the board.

use super::types::DialConfig;
use crate::error::ErrorKind;

/// Configuration invariant violations
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Price range is not finite or `min >= max`
    InvalidPriceRange { min: f32, max: f32 },
    /// Pulse range has `min >= max`
    InvalidCommandRange { min: u16, max: u16 },
    /// Motion step granularity is zero
    ZeroStepGranularity,
    /// Dead band is negative or not finite
    InvalidDeadBand,
    /// Link policy allows no attempts
    ZeroLinkAttempts,
    /// A periodic interval is zero
    ZeroInterval,
    /// A blocking wait would starve the watchdog
    DelayExceedsWatchdog { delay_ms: u32, watchdog_ms: u32 },
    /// Quote request could not be formed
    InvalidRequest(quotedial_protocol::RequestError),
}

impl ConfigError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCommandRange { .. } => ErrorKind::InvalidCommandRange,
            _ => ErrorKind::InvalidConfig,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPriceRange { min, max } => {
                write!(f, "Invalid price range: {:.2}..{:.2}", min, max)
            }
            Self::InvalidCommandRange { min, max } => {
                write!(f, "Invalid pulse range: {}..{} us", min, max)
            }
            Self::ZeroStepGranularity => f.write_str("Step granularity must be non-zero"),
            Self::InvalidDeadBand => f.write_str("Dead band must be finite and non-negative"),
            Self::ZeroLinkAttempts => f.write_str("Link policy needs at least one attempt"),
            Self::ZeroInterval => f.write_str("Periodic intervals must be non-zero"),
            Self::DelayExceedsWatchdog {
                delay_ms,
                watchdog_ms,
            } => write!(
                f,
                "Blocking wait of {} ms exceeds watchdog window of {} ms",
                delay_ms, watchdog_ms
            ),
            Self::InvalidRequest(e) => write!(f, "Invalid quote request: {}", e),
        }
    }
}

impl From<quotedial_protocol::RequestError> for ConfigError {
    fn from(e: quotedial_protocol::RequestError) -> Self {
        Self::InvalidRequest(e)
    }
}

impl DialConfig {
    /// Longest single wait the dial performs without feeding the watchdog
    pub fn longest_blocking_ms(&self) -> u32 {
        [
            self.motion.step_delay_ms,
            self.motion.hold_ms,
            self.motion.attach_settle_ms,
            self.motion.detach_settle_ms,
            self.link.attempt_delay_ms,
            self.request.timeout_ms,
            self.schedule.wake_quantum_ms,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Check all startup invariants against the given watchdog window
    pub fn validate(&self, watchdog_timeout_ms: u32) -> Result<(), ConfigError> {
        let price = self.price;
        if !price.min.is_finite() || !price.max.is_finite() || price.min >= price.max {
            return Err(ConfigError::InvalidPriceRange {
                min: price.min,
                max: price.max,
            });
        }

        if self.pulse.min >= self.pulse.max {
            return Err(ConfigError::InvalidCommandRange {
                min: self.pulse.min,
                max: self.pulse.max,
            });
        }

        if self.motion.step_granularity_us == 0 {
            return Err(ConfigError::ZeroStepGranularity);
        }

        if !self.motion.dead_band.is_finite() || self.motion.dead_band < 0.0 {
            return Err(ConfigError::InvalidDeadBand);
        }

        if self.link.max_attempts == 0 {
            return Err(ConfigError::ZeroLinkAttempts);
        }

        let schedule = self.schedule;
        if schedule.link_check_interval_ms == 0
            || schedule.update_interval_ms == 0
            || schedule.diagnostics_interval_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }

        check_wait(self.longest_blocking_ms(), watchdog_timeout_ms)
    }
}

/// Check one blocking wait against the watchdog window
pub(crate) fn check_wait(delay_ms: u32, watchdog_ms: u32) -> Result<(), ConfigError> {
    if delay_ms >= watchdog_ms {
        return Err(ConfigError::DelayExceedsWatchdog {
            delay_ms,
            watchdog_ms,
        });
    }
    Ok(())
}
