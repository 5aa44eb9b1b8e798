//! Configuration types
//!
//! Defines all configuration structures for the dial. Everything here is
//! fixed at startup; `DialConfig::validate` enforces the invariants the rest
//! of the crate relies on.

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::ConfigError;
