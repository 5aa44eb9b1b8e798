//! Build-time dial configuration
//!
//! `build.rs` validates `dial.toml` and writes it out as constants. Secrets
//! come from the build environment and never live in the repository.

use quotedial_core::config::{
    DialConfig, LinkPolicy, MotionTiming, PriceRange, PulseRange, RequestPolicy, ScheduleConfig,
    ValidationPolicy, DEFAULT_SERVO_PIN,
};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/dial_config.rs"));
}

pub use generated::SYMBOL;

/// Wi-Fi network name (`QUOTEDIAL_WIFI_SSID`)
pub const WIFI_SSID: &str = match option_env!("QUOTEDIAL_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

/// Wi-Fi passphrase (`QUOTEDIAL_WIFI_PASSWORD`)
pub const WIFI_PASSWORD: &str = match option_env!("QUOTEDIAL_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// Quote service API key (`QUOTEDIAL_API_KEY`)
pub const API_KEY: &str = match option_env!("QUOTEDIAL_API_KEY") {
    Some(key) => key,
    None => "",
};

/// Assemble the dial configuration from the generated constants
pub fn dial_config() -> DialConfig {
    use generated::*;

    DialConfig {
        price: PriceRange::new(PRICE_MIN, PRICE_MAX),
        pulse: PulseRange::new(PULSE_MIN_US, PULSE_MAX_US),
        servo_pin: DEFAULT_SERVO_PIN,
        motion: MotionTiming {
            step_granularity_us: STEP_GRANULARITY_US,
            step_delay_ms: STEP_DELAY_MS,
            hold_ms: HOLD_MS,
            attach_settle_ms: ATTACH_SETTLE_MS,
            detach_settle_ms: DETACH_SETTLE_MS,
            dead_band: DEAD_BAND,
        },
        schedule: ScheduleConfig {
            link_check_interval_ms: LINK_CHECK_INTERVAL_MS,
            update_interval_ms: UPDATE_INTERVAL_MS,
            diagnostics_interval_ms: DIAGNOSTICS_INTERVAL_MS,
            wake_quantum_ms: WAKE_QUANTUM_MS,
        },
        link: LinkPolicy {
            max_attempts: LINK_MAX_ATTEMPTS,
            attempt_delay_ms: LINK_ATTEMPT_DELAY_MS,
        },
        request: RequestPolicy {
            timeout_ms: REQUEST_TIMEOUT_MS,
        },
        validation: ValidationPolicy {
            absurd_ceiling: ABSURD_CEILING,
        },
        calibrate_on_boot: CALIBRATE_ON_BOOT,
    }
}
