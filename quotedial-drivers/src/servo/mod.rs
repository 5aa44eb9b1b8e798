//! Servo drivers
//!
//! Hobby servos read the width of a pulse repeated every 20 ms. The width
//! sets the horn angle; holding the line low lets the servo go limp.

pub mod pwm;

pub use pwm::{PwmServo, PwmServoConfig, DEFAULT_START_US, SERVO_PERIOD_US};
