//! Startup calibration sweep
//!
//! Drives the needle to each end of its travel and back to the middle so
//! the mechanical range can be checked by eye after every boot.

use heapless::Vec;

use crate::config::PulseRange;

/// Maximum waypoints in one sweep
pub const MAX_WAYPOINTS: usize = 8;

/// A position to visit and how long to stay there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waypoint {
    /// Pulse width (µs)
    pub command: u16,
    /// Dwell after the command is written
    pub dwell_ms: u32,
}

impl Waypoint {
    pub const fn new(command: u16, dwell_ms: u32) -> Self {
        Self { command, dwell_ms }
    }
}

/// Errors building a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// No waypoints given
    Empty,
    /// More than [`MAX_WAYPOINTS`] given
    TooManyWaypoints,
}

/// Ordered list of waypoints visited in one attach cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSweep {
    waypoints: Vec<Waypoint, MAX_WAYPOINTS>,
}

impl CalibrationSweep {
    /// Lowest-price end, highest-price end, then centre
    pub fn standard(pulse: PulseRange) -> Self {
        let mut waypoints = Vec::new();
        // capacity is well above three
        let _ = waypoints.push(Waypoint::new(pulse.max, 2000));
        let _ = waypoints.push(Waypoint::new(pulse.min, 2000));
        let _ = waypoints.push(Waypoint::new(pulse.center(), 1000));
        Self { waypoints }
    }

    /// Build a custom sweep
    pub fn from_waypoints(points: &[Waypoint]) -> Result<Self, CalibrationError> {
        if points.is_empty() {
            return Err(CalibrationError::Empty);
        }
        let waypoints =
            Vec::from_slice(points).map_err(|_| CalibrationError::TooManyWaypoints)?;
        Ok(Self { waypoints })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Longest single dwell, for the watchdog check
    pub fn longest_dwell_ms(&self) -> u32 {
        self.waypoints
            .iter()
            .map(|w| w.dwell_ms)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_sweep() {
        let sweep = CalibrationSweep::standard(PulseRange::new(450, 2400));
        assert_eq!(
            sweep.waypoints(),
            &[
                Waypoint::new(2400, 2000),
                Waypoint::new(450, 2000),
                Waypoint::new(1425, 1000),
            ]
        );
        assert_eq!(sweep.longest_dwell_ms(), 2000);
    }

    #[test]
    fn test_custom_sweep_limits() {
        assert_eq!(
            CalibrationSweep::from_waypoints(&[]),
            Err(CalibrationError::Empty)
        );
        let many = [Waypoint::new(1500, 10); MAX_WAYPOINTS + 1];
        assert_eq!(
            CalibrationSweep::from_waypoints(&many),
            Err(CalibrationError::TooManyWaypoints)
        );
        assert!(CalibrationSweep::from_waypoints(&many[..MAX_WAYPOINTS]).is_ok());
    }
}
