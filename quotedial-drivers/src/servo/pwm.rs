//! Servo on a PWM channel
//!
//! The PWM slice must already run at the servo frame rate (50 Hz). Pulse
//! widths are converted to a fraction of the frame, so the driver works
//! with any counter resolution.
//!
//! ```ignore
//! let mut servo = PwmServo::new(channel, PwmServoConfig::on_pin(2));
//! servo.attach(2, PulseRange::new(450, 2400))?;
//! servo.write_command(1500)?;
//! servo.detach()?;
//! ```

use embedded_hal::pwm::SetDutyCycle;
use quotedial_core::config::PulseRange;
use quotedial_core::traits::{Actuator, ActuatorError};

/// Servo frame period (µs)
pub const SERVO_PERIOD_US: u16 = 20_000;

/// Position assumed at power-on, before anything is written
pub const DEFAULT_START_US: u16 = 1500;

/// PWM servo configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmServoConfig {
    /// GPIO pin the channel drives
    pub pin: u8,
    /// Frame period the PWM slice is set up for (µs)
    pub period_us: u16,
    /// Assumed horn position at power-on (µs)
    pub initial_us: u16,
}

impl PwmServoConfig {
    pub const fn on_pin(pin: u8) -> Self {
        Self {
            pin,
            period_us: SERVO_PERIOD_US,
            initial_us: DEFAULT_START_US,
        }
    }
}

/// Hobby servo driven by one PWM channel
pub struct PwmServo<P> {
    pwm: P,
    config: PwmServoConfig,
    /// Limits while attached
    range: Option<PulseRange>,
    /// Last commanded pulse width
    current_us: u16,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Wrap a PWM channel; the output is driven low until attached
    pub fn new(mut pwm: P, config: PwmServoConfig) -> Self {
        let _ = pwm.set_duty_cycle_fully_off();
        Self {
            pwm,
            config,
            range: None,
            current_us: config.initial_us,
        }
    }

    pub fn config(&self) -> &PwmServoConfig {
        &self.config
    }

    fn output(&mut self, pulse_us: u16) -> Result<(), ActuatorError> {
        let pulse_us = pulse_us.min(self.config.period_us);
        self.pwm
            .set_duty_cycle_fraction(pulse_us, self.config.period_us)
            .map_err(|_| ActuatorError::Driver)
    }
}

impl<P: SetDutyCycle> Actuator for PwmServo<P> {
    fn attach(&mut self, pin: u8, range: PulseRange) -> Result<(), ActuatorError> {
        if pin != self.config.pin {
            return Err(ActuatorError::PinMismatch {
                expected: self.config.pin,
                requested: pin,
            });
        }
        // Resume at the last known position so attaching does not jerk the horn
        let start = range.clamp(self.current_us);
        self.output(start)?;
        self.current_us = start;
        self.range = Some(range);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::Driver)?;
        self.range = None;
        Ok(())
    }

    fn write_command(&mut self, pulse_us: u16) -> Result<(), ActuatorError> {
        let range = self.range.ok_or(ActuatorError::NotAttached)?;
        let pulse_us = range.clamp(pulse_us);
        self.output(pulse_us)?;
        self.current_us = pulse_us;
        Ok(())
    }

    fn read_current_command(&self) -> u16 {
        self.current_us
    }

    fn is_attached(&self) -> bool {
        self.range.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::{Error, ErrorKind, ErrorType};
    use proptest::prelude::*;

    /// RP2040 slice at 125 MHz, divider 64: 39062 counts per 20 ms
    const TOP: u16 = 39_062;

    struct MockPwm {
        duty: u16,
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            TOP
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPwm;

    impl ErrorType for BrokenPwm {
        type Error = Broken;
    }

    impl SetDutyCycle for BrokenPwm {
        fn max_duty_cycle(&self) -> u16 {
            TOP
        }

        fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
            Err(Broken)
        }
    }

    fn servo() -> PwmServo<MockPwm> {
        PwmServo::new(MockPwm { duty: 1234 }, PwmServoConfig::on_pin(2))
    }

    const RANGE: PulseRange = PulseRange::new(450, 2400);

    #[test]
    fn test_new_drives_low() {
        let servo = servo();
        assert!(!servo.is_attached());
        assert_eq!(servo.pwm.duty, 0);
        assert_eq!(servo.read_current_command(), DEFAULT_START_US);
    }

    #[test]
    fn test_attach_resumes_last_position() {
        let mut servo = servo();
        servo.attach(2, RANGE).unwrap();
        assert!(servo.is_attached());
        assert_eq!(servo.pwm.duty, (1500u32 * TOP as u32 / 20_000) as u16);
    }

    #[test]
    fn test_attach_wrong_pin() {
        let mut servo = servo();
        assert_eq!(
            servo.attach(5, RANGE),
            Err(ActuatorError::PinMismatch {
                expected: 2,
                requested: 5
            })
        );
        assert!(!servo.is_attached());
    }

    #[test]
    fn test_write_requires_attach() {
        let mut servo = servo();
        assert_eq!(servo.write_command(1500), Err(ActuatorError::NotAttached));
    }

    #[test]
    fn test_write_clamps_and_tracks() {
        let mut servo = servo();
        servo.attach(2, RANGE).unwrap();

        servo.write_command(3000).unwrap();
        assert_eq!(servo.read_current_command(), 2400);
        assert_eq!(servo.pwm.duty, (2400u32 * TOP as u32 / 20_000) as u16);

        servo.write_command(450).unwrap();
        assert_eq!(servo.read_current_command(), 450);
    }

    #[test]
    fn test_detach_goes_limp_and_keeps_position() {
        let mut servo = servo();
        servo.attach(2, RANGE).unwrap();
        servo.write_command(900).unwrap();
        servo.detach().unwrap();

        assert!(!servo.is_attached());
        assert_eq!(servo.pwm.duty, 0);
        assert_eq!(servo.read_current_command(), 900);
        assert_eq!(servo.write_command(1000), Err(ActuatorError::NotAttached));
    }

    #[test]
    fn test_pwm_error_maps_to_driver() {
        let mut servo = PwmServo::new(BrokenPwm, PwmServoConfig::on_pin(2));
        assert_eq!(servo.attach(2, RANGE), Err(ActuatorError::Driver));
        assert!(!servo.is_attached());
    }

    proptest! {
        #[test]
        fn duty_never_exceeds_range(pulse in 0u16..=u16::MAX) {
            let mut servo = servo();
            servo.attach(2, RANGE).unwrap();
            servo.write_command(pulse).unwrap();
            let max_duty = (2400u32 * TOP as u32 / 20_000) as u16;
            let min_duty = (450u32 * TOP as u32 / 20_000) as u16;
            prop_assert!(servo.pwm.duty >= min_duty && servo.pwm.duty <= max_duty);
        }
    }
}
