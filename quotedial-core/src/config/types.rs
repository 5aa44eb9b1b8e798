//! Configuration type definitions
//!
//! Defaults reproduce the production build: an NVDA dial spanning
//! $95.00 to $150.00 on a servo driven between 450 µs and 2400 µs.

/// Default ticker symbol
pub const DEFAULT_SYMBOL: &str = "NVDA";

/// Default GPIO pin carrying the servo signal
pub const DEFAULT_SERVO_PIN: u8 = 2;

/// Price band shown on the dial face (dollars)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PriceRange {
    /// Price at the low end of the dial
    pub min: f32,
    /// Price at the high end of the dial
    pub max: f32,
}

impl PriceRange {
    /// Create a new price range
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check if a price lies on the dial face (inclusive)
    pub fn contains(&self, price: f32) -> bool {
        price >= self.min && price <= self.max
    }

    /// Clamp a price to the dial face
    pub fn clamp(&self, price: f32) -> f32 {
        price.clamp(self.min, self.max)
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(95.0, 150.0)
    }
}

/// Servo pulse width limits (microseconds)
///
/// The mapping is inverted: `max` is the lowest price position and `min`
/// the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseRange {
    /// Shortest pulse (highest price)
    pub min: u16,
    /// Longest pulse (lowest price)
    pub max: u16,
}

impl PulseRange {
    /// Create a new pulse range
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Check if a pulse width is within limits (inclusive)
    pub fn contains(&self, pulse_us: u16) -> bool {
        pulse_us >= self.min && pulse_us <= self.max
    }

    /// Clamp a pulse width to limits
    pub fn clamp(&self, pulse_us: u16) -> u16 {
        pulse_us.clamp(self.min, self.max)
    }

    /// Midpoint of the range
    pub fn center(&self) -> u16 {
        self.min + (self.max - self.min) / 2
    }
}

impl Default for PulseRange {
    fn default() -> Self {
        Self::new(450, 2400)
    }
}

/// Servo motion timing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionTiming {
    /// Pulse change per motion step (µs)
    pub step_granularity_us: u16,
    /// Pause after each intermediate step
    pub step_delay_ms: u32,
    /// Dwell at the target before power is cut
    pub hold_ms: u32,
    /// Settle time after attaching the servo
    pub attach_settle_ms: u32,
    /// Settle time after detaching the servo
    pub detach_settle_ms: u32,
    /// Minimum price change (dollars) worth moving for
    pub dead_band: f32,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            step_granularity_us: 10,
            step_delay_ms: 50,
            hold_ms: 1500,
            attach_settle_ms: 100,
            detach_settle_ms: 100,
            dead_band: 0.1,
        }
    }
}

/// Periodic work intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleConfig {
    /// Time between connectivity checks
    pub link_check_interval_ms: u64,
    /// Time between quote polls
    pub update_interval_ms: u64,
    /// Time between diagnostics reports
    pub diagnostics_interval_ms: u64,
    /// Sleep between wake cycles
    pub wake_quantum_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            link_check_interval_ms: 60_000,
            // 80 minutes: 18 calls per day, inside the free-tier budget of 25
            update_interval_ms: 4_800_000,
            diagnostics_interval_ms: 3_600_000,
            wake_quantum_ms: 1000,
        }
    }
}

/// Reconnect policy for the network link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkPolicy {
    /// Link state polls before giving up
    pub max_attempts: u8,
    /// Pause between polls
    pub attempt_delay_ms: u32,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            attempt_delay_ms: 500,
        }
    }
}

/// Quote request policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestPolicy {
    /// Upper bound on one request, connect to last body byte
    pub timeout_ms: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self { timeout_ms: 6000 }
    }
}

/// Plausibility limits for polled prices
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidationPolicy {
    /// Prices above this are treated as garbage rather than clamped
    pub absurd_ceiling: f32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            absurd_ceiling: 1_000_000.0,
        }
    }
}

/// Complete dial configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DialConfig {
    /// Price band on the dial face
    pub price: PriceRange,
    /// Servo pulse limits
    pub pulse: PulseRange,
    /// GPIO pin carrying the servo signal
    pub servo_pin: u8,
    /// Motion timing
    pub motion: MotionTiming,
    /// Periodic intervals
    pub schedule: ScheduleConfig,
    /// Reconnect policy
    pub link: LinkPolicy,
    /// Request policy
    pub request: RequestPolicy,
    /// Validation limits
    pub validation: ValidationPolicy,
    /// Sweep the full range once at boot
    pub calibrate_on_boot: bool,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            price: PriceRange::default(),
            pulse: PulseRange::default(),
            servo_pin: DEFAULT_SERVO_PIN,
            motion: MotionTiming::default(),
            schedule: ScheduleConfig::default(),
            link: LinkPolicy::default(),
            request: RequestPolicy::default(),
            validation: ValidationPolicy::default(),
            calibrate_on_boot: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_contains() {
        let range = PriceRange::new(95.0, 150.0);
        assert!(range.contains(95.0));
        assert!(range.contains(150.0));
        assert!(range.contains(120.5));
        assert!(!range.contains(94.99));
        assert!(!range.contains(150.01));
    }

    #[test]
    fn test_pulse_range_clamp_and_center() {
        let range = PulseRange::new(450, 2400);
        assert_eq!(range.clamp(100), 450);
        assert_eq!(range.clamp(3000), 2400);
        assert_eq!(range.clamp(1500), 1500);
        assert_eq!(range.center(), 1425);
    }

    #[test]
    fn test_default_config() {
        let config = DialConfig::default();

        assert_eq!(config.price, PriceRange::new(95.0, 150.0));
        assert_eq!(config.pulse, PulseRange::new(450, 2400));
        assert_eq!(config.servo_pin, 2);
        assert_eq!(config.motion.step_granularity_us, 10);
        assert_eq!(config.schedule.update_interval_ms, 80 * 60 * 1000);
        assert_eq!(config.link.max_attempts, 20);
        assert!(config.calibrate_on_boot);
    }
}
