//! Build script for quotedial-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates dial.toml at compile time and turns it into constants
//! - Checks the Wi-Fi chip firmware blobs and credentials are present

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Must match `board::WATCHDOG_TIMEOUT_MS`
const WATCHDOG_TIMEOUT_MS: u64 = 8000;

/// Wi-Fi chip firmware the binary embeds
const CYW43_BLOBS: [&str; 2] = ["cyw43-firmware/43439A0.bin", "cyw43-firmware/43439A0_clm.bin"];

/// Build-time credential variables
const CREDENTIAL_VARS: [&str; 3] = [
    "QUOTEDIAL_WIFI_SSID",
    "QUOTEDIAL_WIFI_PASSWORD",
    "QUOTEDIAL_API_KEY",
];

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DialToml {
    quote: QuoteSection,
    dial: DialSection,
    motion: MotionSection,
    schedule: ScheduleSection,
    wifi: WifiSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct QuoteSection {
    symbol: String,
    request_timeout_ms: u64,
    absurd_ceiling: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DialSection {
    price_min: f64,
    price_max: f64,
    pulse_min_us: u64,
    pulse_max_us: u64,
    calibrate_on_boot: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MotionSection {
    step_granularity_us: u64,
    step_delay_ms: u64,
    hold_ms: u64,
    attach_settle_ms: u64,
    detach_settle_ms: u64,
    dead_band: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleSection {
    link_check_interval_s: u64,
    update_interval_min: u64,
    diagnostics_interval_min: u64,
    wake_quantum_ms: u64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WifiSection {
    max_attempts: u64,
    attempt_delay_ms: u64,
}

fn main() {
    setup_linker();
    check_firmware_blobs();
    check_credentials();
    let config = validate_config();
    generate_constants(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// The CYW43439 firmware is not redistributable with this crate
fn check_firmware_blobs() {
    let missing: Vec<&str> = CYW43_BLOBS
        .iter()
        .copied()
        .filter(|blob| {
            println!("cargo:rerun-if-changed={}", blob);
            !Path::new(blob).exists()
        })
        .collect();

    if !missing.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: CYW43439 firmware blobs not found!                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ║                                                                  ║\n\
            ║  Copy them from the embassy repository (cyw43-firmware/) into    ║\n\
            ║  the quotedial-firmware directory.                               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            missing
                .iter()
                .map(|m| format!("║  • {:<62} ║", m))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Credentials are optional at build time but the dial cannot poll without them
fn check_credentials() {
    for var in CREDENTIAL_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
        if env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
            println!(
                "cargo:warning={} is not set; the dial will halt at boot",
                var
            );
        }
    }
}

/// Validate dial.toml at compile time
fn validate_config() -> DialToml {
    // Re-run if dial.toml changes
    println!("cargo:rerun-if-changed=dial.toml");

    let config_path = Path::new("dial.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: dial.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a dial.toml configuration file.           ║\n\
            ║  Please create one in the quotedial-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read dial.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse TOML and check the shape
    let config: DialToml = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid dial.toml                                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_values(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid dial configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=dial.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check value ranges and the watchdog budget
fn check_values(config: &DialToml) -> Vec<String> {
    let mut errors = Vec::new();

    let symbol = &config.quote.symbol;
    if symbol.is_empty() || symbol.len() > 12 {
        errors.push("[quote] symbol must be 1-12 characters".to_string());
    }
    if !symbol
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        errors.push("[quote] symbol may only contain A-Z, 0-9, '.' and '-'".to_string());
    }
    if config.quote.absurd_ceiling <= config.dial.price_max {
        errors.push("[quote] absurd_ceiling must be above price_max".to_string());
    }

    let dial = &config.dial;
    if !(dial.price_min > 0.0 && dial.price_min < dial.price_max) {
        errors.push("[dial] need 0 < price_min < price_max".to_string());
    }
    if dial.pulse_min_us >= dial.pulse_max_us {
        errors.push("[dial] pulse_min_us must be below pulse_max_us".to_string());
    }
    if dial.pulse_max_us > 20_000 {
        errors.push("[dial] pulse_max_us must fit the 20 ms servo frame".to_string());
    }

    let motion = &config.motion;
    if motion.step_granularity_us == 0 || motion.step_granularity_us > u64::from(u16::MAX) {
        errors.push("[motion] step_granularity_us must be 1-65535".to_string());
    }
    if !(motion.dead_band >= 0.0) {
        errors.push("[motion] dead_band must be non-negative".to_string());
    }

    let schedule = &config.schedule;
    if schedule.link_check_interval_s == 0
        || schedule.update_interval_min == 0
        || schedule.diagnostics_interval_min == 0
    {
        errors.push("[schedule] intervals must be non-zero".to_string());
    }
    if schedule.update_interval_min < 58 {
        println!(
            "cargo:warning=update_interval_min {} exceeds 25 requests a day on the free tier",
            schedule.update_interval_min
        );
    }

    if config.wifi.max_attempts == 0 || config.wifi.max_attempts > u64::from(u8::MAX) {
        errors.push("[wifi] max_attempts must be 1-255".to_string());
    }

    let waits = [
        ("[quote] request_timeout_ms", config.quote.request_timeout_ms),
        ("[motion] step_delay_ms", motion.step_delay_ms),
        ("[motion] hold_ms", motion.hold_ms),
        ("[motion] attach_settle_ms", motion.attach_settle_ms),
        ("[motion] detach_settle_ms", motion.detach_settle_ms),
        ("[schedule] wake_quantum_ms", schedule.wake_quantum_ms),
        ("[wifi] attempt_delay_ms", config.wifi.attempt_delay_ms),
    ];
    for (name, ms) in waits {
        if ms >= WATCHDOG_TIMEOUT_MS {
            errors.push(format!(
                "{} must be below the {} ms watchdog",
                name, WATCHDOG_TIMEOUT_MS
            ));
        }
    }

    errors
}

/// Write the validated values as Rust constants
fn generate_constants(config: &DialToml) {
    let mut out = String::new();
    let q = &config.quote;
    let d = &config.dial;
    let m = &config.motion;
    let s = &config.schedule;
    let w = &config.wifi;

    writeln!(out, "pub const SYMBOL: &str = {:?};", q.symbol).unwrap();
    writeln!(out, "pub const REQUEST_TIMEOUT_MS: u32 = {};", q.request_timeout_ms).unwrap();
    writeln!(out, "pub const ABSURD_CEILING: f32 = {:?};", q.absurd_ceiling as f32).unwrap();
    writeln!(out, "pub const PRICE_MIN: f32 = {:?};", d.price_min as f32).unwrap();
    writeln!(out, "pub const PRICE_MAX: f32 = {:?};", d.price_max as f32).unwrap();
    writeln!(out, "pub const PULSE_MIN_US: u16 = {};", d.pulse_min_us).unwrap();
    writeln!(out, "pub const PULSE_MAX_US: u16 = {};", d.pulse_max_us).unwrap();
    writeln!(out, "pub const CALIBRATE_ON_BOOT: bool = {};", d.calibrate_on_boot).unwrap();
    writeln!(out, "pub const STEP_GRANULARITY_US: u16 = {};", m.step_granularity_us).unwrap();
    writeln!(out, "pub const STEP_DELAY_MS: u32 = {};", m.step_delay_ms).unwrap();
    writeln!(out, "pub const HOLD_MS: u32 = {};", m.hold_ms).unwrap();
    writeln!(out, "pub const ATTACH_SETTLE_MS: u32 = {};", m.attach_settle_ms).unwrap();
    writeln!(out, "pub const DETACH_SETTLE_MS: u32 = {};", m.detach_settle_ms).unwrap();
    writeln!(out, "pub const DEAD_BAND: f32 = {:?};", m.dead_band as f32).unwrap();
    writeln!(
        out,
        "pub const LINK_CHECK_INTERVAL_MS: u64 = {};",
        s.link_check_interval_s * 1000
    )
    .unwrap();
    writeln!(
        out,
        "pub const UPDATE_INTERVAL_MS: u64 = {};",
        s.update_interval_min * 60_000
    )
    .unwrap();
    writeln!(
        out,
        "pub const DIAGNOSTICS_INTERVAL_MS: u64 = {};",
        s.diagnostics_interval_min * 60_000
    )
    .unwrap();
    writeln!(out, "pub const WAKE_QUANTUM_MS: u32 = {};", s.wake_quantum_ms).unwrap();
    writeln!(out, "pub const LINK_MAX_ATTEMPTS: u8 = {};", w.max_attempts).unwrap();
    writeln!(out, "pub const LINK_ATTEMPT_DELAY_MS: u32 = {};", w.attempt_delay_ms).unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("dial_config.rs"), out).unwrap();
}
