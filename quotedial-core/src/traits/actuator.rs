//! Servo actuator trait

use crate::config::PulseRange;

/// Errors that can occur driving the servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Attach requested on a pin other than the one the driver owns
    PinMismatch { expected: u8, requested: u8 },
    /// Command written while detached
    NotAttached,
    /// Underlying PWM peripheral reported an error
    Driver,
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinMismatch {
                expected,
                requested,
            } => write!(f, "Servo on pin {} cannot attach pin {}", expected, requested),
            Self::NotAttached => f.write_str("Servo not attached"),
            Self::Driver => f.write_str("PWM driver error"),
        }
    }
}

/// Trait for a hobby servo driven by pulse width
///
/// Commands are pulse widths in microseconds. While detached the signal
/// line is idle and the servo draws no holding current.
pub trait Actuator {
    /// Start the PWM signal on `pin`, limited to `range`
    fn attach(&mut self, pin: u8, range: PulseRange) -> Result<(), ActuatorError>;

    /// Stop the PWM signal
    fn detach(&mut self) -> Result<(), ActuatorError>;

    /// Set the pulse width
    fn write_command(&mut self, pulse_us: u16) -> Result<(), ActuatorError>;

    /// Last commanded pulse width
    ///
    /// Hobby servos give no position feedback, so this is the last value
    /// written (or the driver's power-on default).
    fn read_current_command(&self) -> u16;

    /// Check if the signal is running
    fn is_attached(&self) -> bool;
}
