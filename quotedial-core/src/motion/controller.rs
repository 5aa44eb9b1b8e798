//! Servo motion state machine
//!
//! `Detached → Attaching → Moving → Holding → Detaching → Detached`
//!
//! Each call to [`MotionController::poll`] performs one transition, feeds
//! the watchdog and returns how long to wait before the next call. No call
//! blocks, so a movement never starves the watchdog.

use core::fmt;

use super::calibration::CalibrationSweep;
use super::profile::MotionProfile;
use crate::config::{MotionTiming, PulseRange};
use crate::error::ErrorKind;
use crate::health::HealthTracker;
use crate::traits::{Actuator, ActuatorError, Watchdog};

/// Externally visible motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Servo unpowered, no job
    Detached,
    /// Signal started, waiting for the servo to settle
    Attaching,
    /// Stepping toward the target
    Moving,
    /// At the target, dwelling so the dial can be read
    Holding,
    /// Signal stopped, waiting for the servo to settle
    Detaching,
}

/// Result of a motion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionRequest {
    /// Movement queued; drive it with `poll`
    Started,
    /// Change inside the dead band, nothing to do
    Skipped,
}

/// What one `poll` call asks of the caller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPoll {
    /// No job pending
    Idle,
    /// Wait this long, then poll again
    Wait(u32),
    /// Job finished
    Done(Result<MotionOutcome, MotionError>),
}

/// Successful end of a job
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionOutcome {
    /// Dial moved to show `value`
    Tracked { value: f32, command: u16, steps: u32 },
    /// Startup sweep completed
    Calibrated,
}

/// Motion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A job is already in progress
    Busy,
    /// Servo driver refused an operation
    Actuator(ActuatorError),
}

impl MotionError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ActuatorFault
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("Motion already in progress"),
            Self::Actuator(e) => write!(f, "Servo fault: {}", e),
        }
    }
}

impl From<ActuatorError> for MotionError {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Job {
    Track { value: f32, target: u16 },
    Sweep(CalibrationSweep),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Detached,
    Attaching,
    Moving { profile: MotionProfile, next: u32 },
    Sweeping { next: usize },
    Holding,
    Detaching,
}

/// Owns the servo attach cycle and steps it through a movement
#[derive(Debug, Clone)]
pub struct MotionController {
    pin: u8,
    pulse: PulseRange,
    timing: MotionTiming,
    phase: Phase,
    job: Option<Job>,
    /// Step count of the running track job
    steps: u32,
}

impl MotionController {
    pub fn new(pin: u8, pulse: PulseRange, timing: MotionTiming) -> Self {
        Self {
            pin,
            pulse,
            timing,
            phase: Phase::Detached,
            job: None,
            steps: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> MotionState {
        match self.phase {
            Phase::Detached => MotionState::Detached,
            Phase::Attaching => MotionState::Attaching,
            Phase::Moving { .. } | Phase::Sweeping { .. } => MotionState::Moving,
            Phase::Holding => MotionState::Holding,
            Phase::Detaching => MotionState::Detaching,
        }
    }

    /// Check if a job is pending or running
    pub fn is_busy(&self) -> bool {
        self.job.is_some()
    }

    /// Queue a move to `command` for `value`
    ///
    /// Skipped when `value` is within the dead band of the last value the
    /// dial finished moving to.
    pub fn request(
        &mut self,
        value: f32,
        command: u16,
        health: &HealthTracker,
    ) -> Result<MotionRequest, MotionError> {
        if self.is_busy() {
            return Err(MotionError::Busy);
        }
        if let Some(last) = health.last_accepted_value() {
            let diff = if value > last { value - last } else { last - value };
            if diff < self.timing.dead_band {
                return Ok(MotionRequest::Skipped);
            }
        }
        self.job = Some(Job::Track {
            value,
            target: self.pulse.clamp(command),
        });
        Ok(MotionRequest::Started)
    }

    /// Queue a calibration sweep
    pub fn request_sweep(&mut self, sweep: CalibrationSweep) -> Result<(), MotionError> {
        if self.is_busy() {
            return Err(MotionError::Busy);
        }
        self.job = Some(Job::Sweep(sweep));
        Ok(())
    }

    /// Advance the current job by one transition
    pub fn poll<A: Actuator, W: Watchdog>(
        &mut self,
        actuator: &mut A,
        watchdog: &mut W,
        health: &mut HealthTracker,
    ) -> MotionPoll {
        watchdog.feed();

        match self.phase {
            Phase::Detached => {
                if self.job.is_none() {
                    return MotionPoll::Idle;
                }
                if !actuator.is_attached() {
                    if let Err(e) = actuator.attach(self.pin, self.pulse) {
                        return self.fail(actuator, health, e);
                    }
                }
                health.set_actuator_attached(true);
                self.phase = Phase::Attaching;
                MotionPoll::Wait(self.timing.attach_settle_ms)
            }
            Phase::Attaching => {
                match &self.job {
                    Some(Job::Track { target, .. }) => {
                        let start = self.pulse.clamp(actuator.read_current_command());
                        let profile =
                            MotionProfile::new(start, *target, self.timing.step_granularity_us);
                        self.steps = profile.step_count();
                        self.phase = Phase::Moving { profile, next: 0 };
                    }
                    Some(Job::Sweep(_)) => self.phase = Phase::Sweeping { next: 0 },
                    None => self.phase = Phase::Holding,
                }
                self.step(actuator, health)
            }
            Phase::Moving { .. } | Phase::Sweeping { .. } => self.step(actuator, health),
            Phase::Holding => {
                if let Err(e) = actuator.detach() {
                    return self.fail(actuator, health, e);
                }
                health.set_actuator_attached(false);
                self.phase = Phase::Detaching;
                MotionPoll::Wait(self.timing.detach_settle_ms)
            }
            Phase::Detaching => {
                self.phase = Phase::Detached;
                match self.job.take() {
                    Some(Job::Track { value, target }) => {
                        health.record_motion_complete(value);
                        MotionPoll::Done(Ok(MotionOutcome::Tracked {
                            value,
                            command: target,
                            steps: self.steps,
                        }))
                    }
                    Some(Job::Sweep(_)) => MotionPoll::Done(Ok(MotionOutcome::Calibrated)),
                    None => MotionPoll::Idle,
                }
            }
        }
    }

    /// Emit the next command of the running job
    fn step<A: Actuator>(&mut self, actuator: &mut A, health: &mut HealthTracker) -> MotionPoll {
        match self.phase {
            Phase::Moving { profile, next } => {
                let command = profile.command_at(next);
                if let Err(e) = actuator.write_command(command) {
                    return self.fail(actuator, health, e);
                }
                if next >= profile.step_count() {
                    self.phase = Phase::Holding;
                    MotionPoll::Wait(self.timing.hold_ms)
                } else {
                    self.phase = Phase::Moving {
                        profile,
                        next: next + 1,
                    };
                    MotionPoll::Wait(self.timing.step_delay_ms)
                }
            }
            Phase::Sweeping { next } => {
                let Some(Job::Sweep(sweep)) = &self.job else {
                    self.phase = Phase::Holding;
                    return MotionPoll::Wait(0);
                };
                let Some(waypoint) = sweep.waypoints().get(next).copied() else {
                    self.phase = Phase::Holding;
                    return MotionPoll::Wait(0);
                };
                let last = next + 1 >= sweep.waypoints().len();
                if let Err(e) = actuator.write_command(self.pulse.clamp(waypoint.command)) {
                    return self.fail(actuator, health, e);
                }
                self.phase = if last {
                    Phase::Holding
                } else {
                    Phase::Sweeping { next: next + 1 }
                };
                MotionPoll::Wait(waypoint.dwell_ms)
            }
            _ => MotionPoll::Wait(0),
        }
    }

    /// Abandon the job, cutting servo power if possible
    fn fail<A: Actuator>(
        &mut self,
        actuator: &mut A,
        health: &mut HealthTracker,
        error: ActuatorError,
    ) -> MotionPoll {
        if actuator.is_attached() {
            let _ = actuator.detach();
        }
        health.set_actuator_attached(actuator.is_attached());

        let error = MotionError::Actuator(error);
        health.record_error(error.kind(), &error);
        self.phase = Phase::Detached;
        self.job = None;
        self.steps = 0;
        MotionPoll::Done(Err(error))
    }
}
