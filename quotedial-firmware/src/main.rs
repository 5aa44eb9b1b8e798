//! QuoteDial - Stock Price Dial Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W. A hobby servo on
//! GPIO2 swings a printed dial to the latest quote for one ticker, polled
//! over HTTPS every update interval.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::pwm::Pwm;
use embassy_time::{Delay, Timer};
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use quotedial_core::health::HealthTracker;
use quotedial_core::scheduler::{MotionReport, Peripherals, PollReport, Scheduler, WakeReport};
use quotedial_core::traits::{Credentials, Watchdog};
use quotedial_drivers::servo::{PwmServo, PwmServoConfig};
use quotedial_protocol::QuoteRequest;

use crate::board::{BoardWatchdog, RpSystem, WATCHDOG_TIMEOUT_MS};
use crate::net::{ClientState, HttpsTransport, WifiLink, RX_BUFFER, TLS_READ_BUFFER, TLS_WRITE_BUFFER};

mod board;
mod config;
mod net;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

// Static cells for the radio and network stack (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
static TCP_STATE: StaticCell<ClientState> = StaticCell::new();
static TLS_READ: StaticCell<[u8; TLS_READ_BUFFER]> = StaticCell::new();
static TLS_WRITE: StaticCell<[u8; TLS_WRITE_BUFFER]> = StaticCell::new();
static RX: StaticCell<[u8; RX_BUFFER]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("QuoteDial firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut watchdog = BoardWatchdog::new(p.WATCHDOG);
    info!("Reset reason: {}", watchdog.reset_reason());
    watchdog.start();

    // Fatal configuration errors stop here, before anything polls or moves
    let config = config::dial_config();
    if let Err(e) = config.validate(WATCHDOG_TIMEOUT_MS) {
        error!("Invalid configuration: {}", Display2Format(&e));
        halt(watchdog).await;
    }
    let request = match QuoteRequest::new(config::SYMBOL, config::API_KEY) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid quote request: {}", Display2Format(&e));
            halt(watchdog).await
        }
    };
    let credentials = match Credentials::new(config::WIFI_SSID, config::WIFI_PASSWORD) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("Invalid Wi-Fi credentials: {}", Display2Format(&e));
            halt(watchdog).await
        }
    };
    info!(
        "Tracking {} on ${}..${}",
        request.symbol(),
        config.price.min,
        config.price.max
    );

    // Servo on GPIO2 (PWM slice 1, channel A), output low until attached
    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, board::servo_pwm_config());
    let (channel, _) = pwm.split();
    let servo = PwmServo::new(unwrap!(channel), PwmServoConfig::on_pin(config.servo_pin));
    info!("Servo PWM initialized");

    // CYW43439 radio over PIO SPI
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(unwrap!(net::cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    watchdog.feed();
    info!("Radio initialized");

    let mut rng = RoscRng;
    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        rng.next_u64(),
    );
    spawner.spawn(unwrap!(net::net_task(runner)));

    let transport = HttpsTransport::new(
        stack,
        TCP_STATE.init(ClientState::new()),
        TLS_READ.init([0; TLS_READ_BUFFER]),
        TLS_WRITE.init([0; TLS_WRITE_BUFFER]),
        RX.init([0; RX_BUFFER]),
    );

    let io = Peripherals {
        link: WifiLink::new(control, stack),
        transport,
        actuator: servo,
        watchdog,
        delay: Delay,
        system: RpSystem,
    };

    let mut dial = match Scheduler::new(&config, &request, credentials, io) {
        Ok(dial) => dial,
        Err(e) => defmt::panic!("Dial setup failed: {}", Display2Format(&e)),
    };

    info!("Dial ready, entering main loop");

    match dial.start().await {
        Some(MotionReport::Calibrated) => info!("Calibration sweep complete"),
        Some(other) => warn!("Calibration sweep: {}", other),
        None => {}
    }

    dial.run(log_wake).await
}

/// Log what one wake did
fn log_wake(report: &WakeReport, health: &HealthTracker) {
    if let Some(diagnostics) = &report.diagnostics {
        info!("Diagnostics: {}", Display2Format(diagnostics));
    }

    match report.link {
        Some(true) => debug!("Link up"),
        Some(false) => warn!(
            "Link down: {}",
            Display2Format(health.last_error())
        ),
        None => {}
    }

    match report.poll {
        Some(PollReport::Accepted { value, raw, command }) => {
            if raw != value {
                warn!("{}", Display2Format(health.last_warning()));
            }
            info!("Price {} -> {} us", value, command);
        }
        Some(PollReport::Failed(kind)) => warn!(
            "Poll failed ({}): {}",
            kind,
            Display2Format(health.last_error())
        ),
        Some(PollReport::LinkDown) => warn!("Poll skipped, link down"),
        None => {}
    }

    match report.motion {
        Some(MotionReport::Completed { command, steps }) => {
            info!("Dial at {} us after {} steps", command, steps)
        }
        Some(MotionReport::Skipped) => debug!("Change inside dead band, servo idle"),
        Some(MotionReport::Failed(kind)) => error!(
            "Motion failed ({}): {}",
            kind,
            Display2Format(health.last_error())
        ),
        Some(MotionReport::Calibrated) | None => {}
    }
}

/// Stop for good on a fatal error, keeping the watchdog quiet so the
/// board does not reboot into the same failure
async fn halt(mut watchdog: BoardWatchdog) -> ! {
    loop {
        watchdog.feed();
        Timer::after_millis(u64::from(WATCHDOG_TIMEOUT_MS / 2)).await;
    }
}
