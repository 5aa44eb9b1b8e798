//! Linear pulse-width ramp between two commands

/// Stepped ramp from `start` to `target`
///
/// Command `i` is `start + (target - start) * i / step_count`, so every
/// command lies between the endpoints and the last one is exactly `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfile {
    start: u16,
    target: u16,
    step_count: u32,
}

impl MotionProfile {
    /// Plan a ramp moving at most `granularity` µs per step
    pub fn new(start: u16, target: u16, granularity: u16) -> Self {
        let distance = u32::from(start.abs_diff(target));
        let step_count = distance.div_ceil(u32::from(granularity.max(1)));
        Self {
            start,
            target,
            step_count,
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    /// Number of steps between start and target
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Number of commands emitted, start and target included
    pub fn command_count(&self) -> u32 {
        self.step_count + 1
    }

    /// Command at step `index` (saturates at the target)
    pub fn command_at(&self, index: u32) -> u16 {
        if index >= self.step_count {
            return self.target;
        }
        let distance = u32::from(self.start.abs_diff(self.target));
        let delta = (distance * index / self.step_count) as u16;
        if self.target >= self.start {
            self.start + delta
        } else {
            self.start - delta
        }
    }

    /// Iterate over every command in order
    pub fn commands(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.command_count()).map(move |i| self.command_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_sweep_down() {
        let profile = MotionProfile::new(2400, 450, 10);
        let commands: Vec<u16> = profile.commands().collect();

        assert_eq!(commands.len(), 1950 / 10 + 1);
        assert_eq!(commands.first(), Some(&2400));
        assert_eq!(commands.last(), Some(&450));
        assert!(commands.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_uneven_distance_rounds_steps_up() {
        let profile = MotionProfile::new(1500, 1525, 10);
        assert_eq!(profile.step_count(), 3);
        let commands: Vec<u16> = profile.commands().collect();
        assert_eq!(commands, vec![1500, 1508, 1516, 1525]);
    }

    #[test]
    fn test_no_distance() {
        let profile = MotionProfile::new(1200, 1200, 10);
        assert_eq!(profile.step_count(), 0);
        assert_eq!(profile.commands().collect::<Vec<_>>(), vec![1200]);
    }

    #[test]
    fn test_zero_granularity_treated_as_one() {
        let profile = MotionProfile::new(1000, 1005, 0);
        assert_eq!(profile.step_count(), 5);
    }

    proptest! {
        #[test]
        fn strictly_monotonic_and_bounded(
            start in 0u16..4000,
            target in 0u16..4000,
            granularity in 1u16..200,
        ) {
            let profile = MotionProfile::new(start, target, granularity);
            let commands: Vec<u16> = profile.commands().collect();

            let expected = u32::from(start.abs_diff(target)).div_ceil(u32::from(granularity)) + 1;
            prop_assert_eq!(commands.len() as u32, expected);
            prop_assert_eq!(*commands.last().unwrap(), target);

            let (lo, hi) = (start.min(target), start.max(target));
            prop_assert!(commands.iter().all(|&c| c >= lo && c <= hi));

            for pair in commands.windows(2) {
                prop_assert!(pair[0].abs_diff(pair[1]) <= granularity);
                if target < start {
                    prop_assert!(pair[0] > pair[1]);
                } else {
                    prop_assert!(pair[0] < pair[1]);
                }
            }
        }
    }
}
