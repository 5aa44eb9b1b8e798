//! Pico W board glue
//!
//! Hardware watchdog and system monitor implementations for the core
//! traits, plus the PWM settings that put slice 1 at the servo frame rate.

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::{ResetReason, Watchdog as RpWatchdog};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant};
use quotedial_core::traits::{SystemMonitor, Watchdog};

/// Hardware watchdog window
pub const WATCHDOG_TIMEOUT_MS: u32 = 8000;

/// 125 MHz / 64 = 1.953125 MHz PWM counter clock
pub const SERVO_PWM_DIVIDER: u8 = 64;

/// 39_063 counts per 20 ms frame
pub const SERVO_PWM_TOP: u16 = 39_062;

/// PWM configuration for a 50 Hz servo frame
pub fn servo_pwm_config() -> embassy_rp::pwm::Config {
    let mut config = embassy_rp::pwm::Config::default();
    config.divider = SERVO_PWM_DIVIDER.into();
    config.top = SERVO_PWM_TOP;
    config.compare_a = 0;
    config
}

/// RP2040 hardware watchdog
pub struct BoardWatchdog {
    inner: RpWatchdog,
}

impl BoardWatchdog {
    /// Take the watchdog peripheral without starting it
    pub fn new(peripheral: Peri<'static, WATCHDOG>) -> Self {
        Self {
            inner: RpWatchdog::new(peripheral),
        }
    }

    /// Why the previous run ended, read before the watchdog is started
    pub fn reset_reason(&self) -> &'static str {
        match self.inner.reset_reason() {
            Some(ResetReason::TimedOut) => "watchdog timeout",
            Some(ResetReason::Forced) => "forced",
            None => "power-on",
        }
    }

    /// Start counting down
    pub fn start(&mut self) {
        self.inner
            .start(Duration::from_millis(u64::from(WATCHDOG_TIMEOUT_MS)));
    }
}

impl Watchdog for BoardWatchdog {
    fn feed(&mut self) {
        self.inner.feed();
    }

    fn timeout_ms(&self) -> u32 {
        WATCHDOG_TIMEOUT_MS
    }
}

extern "C" {
    /// Start of the free RAM region, provided by cortex-m-rt
    static __sheap: u32;
}

/// Uptime and memory headroom from the RP2040
pub struct RpSystem;

impl SystemMonitor for RpSystem {
    fn uptime_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    /// Bytes between the end of static data and the stack pointer
    #[allow(unsafe_code, unused_unsafe)]
    fn free_memory(&self) -> Option<u32> {
        let stack_pointer = cortex_m::register::msp::read();
        let heap_start = unsafe { core::ptr::addr_of!(__sheap) } as u32;
        Some(stack_pointer.saturating_sub(heap_start))
    }
}
