//! Price to pulse-width mapping
//!
//! The dial is inverted: the lowest price sits at the longest pulse.
//! Prices are scaled to whole cents before interpolating so the result is
//! exact at both ends of the range.

use crate::config::{PriceRange, PulseRange};

/// Maps prices onto servo pulse widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionMapper {
    min_cents: i64,
    max_cents: i64,
    pulse: PulseRange,
}

impl PositionMapper {
    pub fn new(price: PriceRange, pulse: PulseRange) -> Self {
        Self {
            min_cents: to_cents(price.min),
            max_cents: to_cents(price.max),
            pulse,
        }
    }

    pub fn pulse_range(&self) -> PulseRange {
        self.pulse
    }

    /// Pulse width for `value`, always inside the pulse range
    pub fn to_command(&self, value: f32) -> u16 {
        let span_cents = self.max_cents - self.min_cents;
        if value.is_nan() || span_cents <= 0 {
            return self.pulse.max;
        }

        let cents = to_cents(value).clamp(self.min_cents, self.max_cents);
        let span_pulse = i64::from(self.pulse.max) - i64::from(self.pulse.min);
        let offset = (cents - self.min_cents) * span_pulse / span_cents;
        let command = i64::from(self.pulse.max) - offset;

        self.pulse
            .clamp(command.clamp(0, i64::from(u16::MAX)) as u16)
    }
}

/// Round dollars to whole cents, half away from zero
fn to_cents(value: f32) -> i64 {
    let scaled = f64::from(value) * 100.0;
    if scaled >= 0.0 {
        (scaled + 0.5) as i64
    } else {
        (scaled - 0.5) as i64
    }
}
