//! Price validator (clamp policy)
//!
//! Garbage is rejected, plausible prices off the dial face are pinned to
//! the nearest end of the dial, and prices on the face pass unchanged.

use core::fmt;

use crate::config::{PriceRange, ValidationPolicy};
use crate::error::ErrorKind;

/// Price the quote source reports when it has no value
pub const NO_VALUE_SENTINEL: f32 = -1.0;

/// A price the dial may move to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Accepted {
    /// Price to display, always inside the dial range
    pub value: f32,
    /// Raw price when it had to be clamped
    pub clamped_from: Option<f32>,
}

impl Accepted {
    /// Price as polled, before clamping
    pub fn raw(&self) -> f32 {
        self.clamped_from.unwrap_or(self.value)
    }

    /// Check if the raw price was off the dial face
    pub fn was_clamped(&self) -> bool {
        self.clamped_from.is_some()
    }
}

/// Warning text for a clamped price
pub struct ClampWarning<'a>(pub &'a Accepted);

impl fmt::Display for ClampWarning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Price {:.2} off dial, clamped to {:.2}",
            self.0.raw(),
            self.0.value
        )
    }
}

/// Reasons a price is refused
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejected {
    /// Source reported its no-value sentinel
    NoValue,
    /// NaN or infinite
    NotFinite,
    /// Zero or negative
    NonPositive(f32),
    /// Above the plausibility ceiling
    Absurd(f32),
}

impl Rejected {
    /// Classify this rejection
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::OutOfPolicyValue
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoValue => f.write_str("No value available"),
            Self::NotFinite => f.write_str("Price is not a finite number"),
            Self::NonPositive(v) => write!(f, "Non-positive price: {:.2}", v),
            Self::Absurd(v) => write!(f, "Implausible price: {:.2}", v),
        }
    }
}

/// Clamp-policy validator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValueValidator {
    range: PriceRange,
    policy: ValidationPolicy,
}

impl ValueValidator {
    pub fn new(range: PriceRange, policy: ValidationPolicy) -> Self {
        Self { range, policy }
    }

    pub fn range(&self) -> PriceRange {
        self.range
    }

    /// Decide whether `raw` may move the dial
    pub fn validate(&self, raw: f32) -> Result<Accepted, Rejected> {
        if !raw.is_finite() {
            return Err(Rejected::NotFinite);
        }
        if raw == NO_VALUE_SENTINEL {
            return Err(Rejected::NoValue);
        }
        if raw <= 0.0 {
            return Err(Rejected::NonPositive(raw));
        }
        if raw > self.policy.absurd_ceiling {
            return Err(Rejected::Absurd(raw));
        }

        if self.range.contains(raw) {
            Ok(Accepted {
                value: raw,
                clamped_from: None,
            })
        } else {
            Ok(Accepted {
                value: self.range.clamp(raw),
                clamped_from: Some(raw),
            })
        }
    }
}
