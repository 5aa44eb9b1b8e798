//! Board-agnostic core logic for the stock price dial
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (servo, watchdog, network link, transport)
//! - Health tracking (request counters, last error, attach state)
//! - Price validation and price-to-pulse mapping
//! - Stepped servo motion with watchdog servicing
//! - Connectivity guard and quote polling
//! - The cooperative wake-cycle scheduler
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod motion;
pub mod network;
pub mod scheduler;
pub mod traits;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ErrorKind;
