//! Wake cycle
//!
//! Each wake runs, in order and only when due:
//!
//! 1. Feed the watchdog
//! 2. Diagnostics snapshot
//! 3. Connectivity check (a failure ends the wake)
//! 4. Quote poll, then motion to the new price
//!
//! A failed link check is retried when its interval next elapses. A failed
//! poll is retried when the update interval next elapses, never within the
//! same wake.

use embedded_hal_async::delay::DelayNs;
use quotedial_protocol::QuoteRequest;

use super::interval::Interval;
use super::report::{DiagnosticsReport, MotionReport, PollReport, WakeReport};
use crate::config::validate::check_wait;
use crate::config::{ConfigError, DialConfig};
use crate::health::HealthTracker;
use crate::motion::{
    CalibrationSweep, MotionController, MotionError, MotionOutcome, MotionPoll, MotionRequest,
    MotionState,
};
use crate::network::{ConnectivityGuard, ValueSource};
use crate::traits::{Actuator, Credentials, NetworkLink, QuoteTransport, SystemMonitor, Watchdog};
use crate::value::{PositionMapper, ValueValidator};

/// Board collaborators owned by the scheduler
pub struct Peripherals<L, T, A, W, D, S> {
    pub link: L,
    pub transport: T,
    pub actuator: A,
    pub watchdog: W,
    pub delay: D,
    pub system: S,
}

/// The dial's main loop
pub struct Scheduler<L, T, A, W, D, S> {
    io: Peripherals<L, T, A, W, D, S>,
    health: HealthTracker,
    guard: ConnectivityGuard,
    source: ValueSource,
    mapper: PositionMapper,
    motion: MotionController,
    link_check: Interval,
    update: Interval,
    diagnostics: Interval,
    wake_quantum_ms: u32,
    startup_sweep: Option<CalibrationSweep>,
}

impl<L, T, A, W, D, S> Scheduler<L, T, A, W, D, S>
where
    L: NetworkLink,
    T: QuoteTransport,
    A: Actuator,
    W: Watchdog,
    D: DelayNs,
    S: SystemMonitor,
{
    /// Validate the configuration and assemble the dial
    ///
    /// Fails before anything polls or moves if the configuration breaks a
    /// startup invariant.
    pub fn new(
        config: &DialConfig,
        request: &QuoteRequest,
        credentials: Credentials,
        io: Peripherals<L, T, A, W, D, S>,
    ) -> Result<Self, ConfigError> {
        let watchdog_ms = io.watchdog.timeout_ms();
        config.validate(watchdog_ms)?;

        let validator = ValueValidator::new(config.price, config.validation);
        let source = ValueSource::new(request, config.request.timeout_ms, validator)?;

        let startup_sweep = if config.calibrate_on_boot {
            let sweep = CalibrationSweep::standard(config.pulse);
            check_wait(sweep.longest_dwell_ms(), watchdog_ms)?;
            Some(sweep)
        } else {
            None
        };

        let schedule = config.schedule;
        Ok(Self {
            // Uptime counts from reset, not from when the dial was assembled
            health: HealthTracker::new(0),
            guard: ConnectivityGuard::new(credentials, config.link),
            source,
            mapper: PositionMapper::new(config.price, config.pulse),
            motion: MotionController::new(config.servo_pin, config.pulse, config.motion),
            link_check: Interval::new(schedule.link_check_interval_ms),
            update: Interval::new(schedule.update_interval_ms),
            diagnostics: Interval::new(schedule.diagnostics_interval_ms),
            wake_quantum_ms: schedule.wake_quantum_ms,
            startup_sweep,
            io,
        })
    }

    /// Replace the startup sweep (`None` disables it)
    pub fn with_startup_sweep(
        mut self,
        sweep: Option<CalibrationSweep>,
    ) -> Result<Self, ConfigError> {
        if let Some(sweep) = &sweep {
            check_wait(sweep.longest_dwell_ms(), self.io.watchdog.timeout_ms())?;
        }
        self.startup_sweep = sweep;
        Ok(self)
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn peripherals(&self) -> &Peripherals<L, T, A, W, D, S> {
        &self.io
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<L, T, A, W, D, S> {
        &mut self.io
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion.state()
    }

    /// Run the startup sweep, if any
    pub async fn start(&mut self) -> Option<MotionReport> {
        let sweep = self.startup_sweep.take()?;
        if let Err(e) = self.motion.request_sweep(sweep) {
            self.health.record_error(e.kind(), &e);
            return Some(MotionReport::Failed(e.kind()));
        }
        Some(self.drive_motion().await)
    }

    /// One pass of the main loop
    pub async fn wake(&mut self) -> WakeReport {
        self.io.watchdog.feed();
        let now = self.io.system.uptime_ms();
        let mut report = WakeReport::new(now);

        if self.diagnostics.is_due(now) {
            self.diagnostics.mark(now);
            report.diagnostics = Some(DiagnosticsReport::capture(
                &self.health,
                now,
                self.io.system.free_memory(),
            ));
        }

        if self.link_check.is_due(now) {
            self.link_check.mark(now);
            let up = self
                .guard
                .ensure_connected(
                    &mut self.io.link,
                    &mut self.io.delay,
                    &mut self.io.watchdog,
                    &mut self.health,
                )
                .await;
            report.link = Some(up);
            if !up {
                return report;
            }
        }

        if self.update.is_due(now) {
            if !self.io.link.is_connected() {
                report.poll = Some(PollReport::LinkDown);
                return report;
            }
            self.update.mark(now);

            self.io.watchdog.feed();
            let polled_at = self.io.system.uptime_ms();
            match self
                .source
                .poll(&mut self.io.transport, &mut self.health, polled_at)
                .await
            {
                Ok(accepted) => {
                    let command = self.mapper.to_command(accepted.value);
                    report.poll = Some(PollReport::Accepted {
                        value: accepted.value,
                        raw: accepted.raw(),
                        command,
                    });
                    report.motion = Some(self.move_to(accepted.value, command).await);
                }
                Err(failure) => report.poll = Some(PollReport::Failed(failure.kind())),
            }
        }

        report
    }

    /// Wake forever, handing each report to `on_wake`
    pub async fn run<F>(&mut self, mut on_wake: F) -> !
    where
        F: FnMut(&WakeReport, &HealthTracker),
    {
        loop {
            let report = self.wake().await;
            on_wake(&report, &self.health);
            self.io.watchdog.feed();
            self.io.delay.delay_ms(self.wake_quantum_ms).await;
        }
    }

    async fn move_to(&mut self, value: f32, command: u16) -> MotionReport {
        match self.motion.request(value, command, &self.health) {
            Ok(MotionRequest::Skipped) => MotionReport::Skipped,
            Ok(MotionRequest::Started) => self.drive_motion().await,
            Err(e) => {
                self.health.record_error(e.kind(), &e);
                MotionReport::Failed(e.kind())
            }
        }
    }

    /// Poll the motion controller to completion, sleeping between steps
    async fn drive_motion(&mut self) -> MotionReport {
        loop {
            let poll = self.motion.poll(
                &mut self.io.actuator,
                &mut self.io.watchdog,
                &mut self.health,
            );
            match poll {
                MotionPoll::Wait(ms) => self.io.delay.delay_ms(ms).await,
                MotionPoll::Done(result) => return motion_report(result),
                MotionPoll::Idle => return MotionReport::Skipped,
            }
        }
    }
}

fn motion_report(result: Result<MotionOutcome, MotionError>) -> MotionReport {
    match result {
        Ok(MotionOutcome::Tracked { command, steps, .. }) => {
            MotionReport::Completed { command, steps }
        }
        Ok(MotionOutcome::Calibrated) => MotionReport::Calibrated,
        Err(e) => MotionReport::Failed(e.kind()),
    }
}
