//! In-memory collaborators for host tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::config::PulseRange;
use crate::traits::{
    Actuator, ActuatorError, Credentials, HttpResponse, LinkError, NetworkLink, QuoteTransport,
    SystemMonitor, TransportError, Watchdog,
};

/// Shared simulated uptime
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

/// Delay that advances the simulated clock instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    pub clock: SimClock,
    pub waits: Vec<u32>,
}

impl SimDelay {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            waits: Vec::new(),
        }
    }
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns / 1_000_000));
    }

    async fn delay_us(&mut self, us: u32) {
        self.clock.advance(u64::from(us / 1_000));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
        self.clock.advance(u64::from(ms));
    }
}

/// System monitor reading the simulated clock
#[derive(Debug, Clone, Default)]
pub struct SimSystem {
    pub clock: SimClock,
    pub free: Option<u32>,
}

impl SystemMonitor for SimSystem {
    fn uptime_ms(&self) -> u64 {
        self.clock.now()
    }

    fn free_memory(&self) -> Option<u32> {
        self.free
    }
}

/// Servo that records every command
#[derive(Debug, Clone, Default)]
pub struct RecordingServo {
    pub attached: bool,
    pub current: u16,
    pub commands: Vec<u16>,
    pub attach_calls: u32,
    pub detach_calls: u32,
    pub fail_attach: bool,
    /// Accept this many writes, then fail
    pub fail_write_after: Option<usize>,
}

impl RecordingServo {
    pub fn at(current: u16) -> Self {
        Self {
            current,
            ..Default::default()
        }
    }
}

impl Actuator for RecordingServo {
    fn attach(&mut self, _pin: u8, _range: PulseRange) -> Result<(), ActuatorError> {
        self.attach_calls += 1;
        if self.fail_attach {
            return Err(ActuatorError::Driver);
        }
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ActuatorError> {
        self.detach_calls += 1;
        self.attached = false;
        Ok(())
    }

    fn write_command(&mut self, pulse_us: u16) -> Result<(), ActuatorError> {
        if !self.attached {
            return Err(ActuatorError::NotAttached);
        }
        if self.fail_write_after == Some(self.commands.len()) {
            return Err(ActuatorError::Driver);
        }
        self.commands.push(pulse_us);
        self.current = pulse_us;
        Ok(())
    }

    fn read_current_command(&self) -> u16 {
        self.current
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Watchdog that counts feeds
#[derive(Debug, Clone)]
pub struct MockWatchdog {
    pub feeds: u32,
    pub timeout_ms: u32,
}

impl Default for MockWatchdog {
    fn default() -> Self {
        Self {
            feeds: 0,
            timeout_ms: 8000,
        }
    }
}

impl Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }

    fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

/// Link that comes up after a set number of state checks
#[derive(Debug, Default)]
pub struct MockLink {
    pub up: Cell<bool>,
    /// Checks after `begin` before the link reports up; `None` never joins
    pub up_after_checks: Option<u32>,
    pub joining: bool,
    pub checks: Cell<u32>,
    pub begin_calls: u32,
    /// Association is refused outright
    pub fail_begin: bool,
}

impl MockLink {
    pub fn connected() -> Self {
        Self {
            up: Cell::new(true),
            ..Default::default()
        }
    }

    pub fn joins_after(checks: u32) -> Self {
        Self {
            up_after_checks: Some(checks),
            ..Default::default()
        }
    }

    pub fn never_joins() -> Self {
        Self::default()
    }

    pub fn refuses_join() -> Self {
        Self {
            fail_begin: true,
            ..Default::default()
        }
    }

    /// Drop the link, as when the access point goes away
    pub fn drop_link(&mut self) {
        self.up.set(false);
        self.joining = false;
        self.checks.set(0);
    }
}

impl NetworkLink for MockLink {
    fn is_connected(&self) -> bool {
        if self.up.get() {
            return true;
        }
        if self.joining {
            let checks = self.checks.get() + 1;
            self.checks.set(checks);
            if self.up_after_checks.is_some_and(|n| checks >= n) {
                self.up.set(true);
            }
        }
        self.up.get()
    }

    async fn begin(&mut self, _credentials: &Credentials) -> Result<(), LinkError> {
        self.begin_calls += 1;
        if self.fail_begin {
            return Err(LinkError::JoinFailed);
        }
        self.joining = true;
        Ok(())
    }
}

/// Transport replaying canned responses
#[derive(Debug, Default)]
pub struct MockTransport {
    pub responses: VecDeque<Result<(u16, String), TransportError>>,
    pub urls: Vec<String>,
    pub timeouts: Vec<u32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn respond(mut self, status: u16, body: impl Into<String>) -> Self {
        self.responses.push_back(Ok((status, body.into())));
        self
    }

    /// Queue a transport failure
    pub fn fail(mut self, error: TransportError) -> Self {
        self.responses.push_back(Err(error));
        self
    }

    pub fn requests(&self) -> usize {
        self.urls.len()
    }
}

impl QuoteTransport for MockTransport {
    async fn get(
        &mut self,
        url: &str,
        timeout_ms: u32,
        body: &mut [u8],
    ) -> Result<HttpResponse, TransportError> {
        self.urls.push(String::from(url));
        self.timeouts.push(timeout_ms);
        let (status, text) = self
            .responses
            .pop_front()
            .unwrap_or(Err(TransportError::Connect))?;
        // Error pages are not read, so their size never matters
        if !(200..300).contains(&status) {
            return Ok(HttpResponse {
                status,
                body_len: 0,
            });
        }
        let bytes = text.as_bytes();
        if bytes.len() > body.len() {
            return Err(TransportError::BodyTooLarge);
        }
        body[..bytes.len()].copy_from_slice(bytes);
        Ok(HttpResponse {
            status,
            body_len: bytes.len(),
        })
    }
}
