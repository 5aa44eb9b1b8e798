//! Health tracker implementation
//!
//! Counters saturate instead of wrapping. Timestamps are monotonic uptime
//! in milliseconds.

use core::fmt::Display;

use super::message::BoundedMessage;
use crate::error::ErrorKind;

/// Capacity of the last-error and last-warning buffers
pub const MESSAGE_CAPACITY: usize = 100;

/// Bounded error text
pub type ErrorMessage = BoundedMessage<MESSAGE_CAPACITY>;

/// Operational record of the dial since boot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthTracker {
    /// Uptime at which the tracker was created
    boot_ms: u64,
    /// Last price the dial finished moving to
    last_accepted_value: Option<f32>,
    /// Uptime of the last successful poll
    last_successful_poll_ms: Option<u64>,
    successful_requests: u32,
    failed_requests: u32,
    connectivity_failures: u32,
    motions_completed: u32,
    last_error: ErrorMessage,
    last_error_kind: Option<ErrorKind>,
    last_warning: ErrorMessage,
    /// Mirrors the physical servo attach state
    actuator_attached: bool,
}

impl HealthTracker {
    /// Create a tracker for a device that booted at `boot_ms`
    pub fn new(boot_ms: u64) -> Self {
        Self {
            boot_ms,
            last_accepted_value: None,
            last_successful_poll_ms: None,
            successful_requests: 0,
            failed_requests: 0,
            connectivity_failures: 0,
            motions_completed: 0,
            last_error: ErrorMessage::new(),
            last_error_kind: None,
            last_warning: ErrorMessage::new(),
            actuator_attached: false,
        }
    }

    pub fn boot_ms(&self) -> u64 {
        self.boot_ms
    }

    pub fn last_accepted_value(&self) -> Option<f32> {
        self.last_accepted_value
    }

    pub fn last_successful_poll_ms(&self) -> Option<u64> {
        self.last_successful_poll_ms
    }

    pub fn successful_requests(&self) -> u32 {
        self.successful_requests
    }

    pub fn failed_requests(&self) -> u32 {
        self.failed_requests
    }

    pub fn connectivity_failures(&self) -> u32 {
        self.connectivity_failures
    }

    pub fn motions_completed(&self) -> u32 {
        self.motions_completed
    }

    pub fn last_error(&self) -> &ErrorMessage {
        &self.last_error
    }

    pub fn last_error_kind(&self) -> Option<ErrorKind> {
        self.last_error_kind
    }

    pub fn last_warning(&self) -> &ErrorMessage {
        &self.last_warning
    }

    pub fn actuator_attached(&self) -> bool {
        self.actuator_attached
    }

    /// Time since boot
    pub fn uptime_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.boot_ms)
    }

    /// Time since the last successful poll, if any
    pub fn since_last_success_ms(&self, now_ms: u64) -> Option<u64> {
        self.last_successful_poll_ms
            .map(|t| now_ms.saturating_sub(t))
    }

    /// Record a poll that produced an accepted price
    pub fn record_poll_success(&mut self, now_ms: u64) {
        self.successful_requests = self.successful_requests.saturating_add(1);
        self.last_successful_poll_ms = Some(now_ms);
    }

    /// Record a failed poll
    pub fn record_poll_failure<D: Display + ?Sized>(&mut self, kind: ErrorKind, reason: &D) {
        self.failed_requests = self.failed_requests.saturating_add(1);
        self.record_error(kind, reason);
    }

    /// Record a failed connection attempt
    pub fn record_connectivity_failure<D: Display + ?Sized>(&mut self, reason: &D) {
        self.connectivity_failures = self.connectivity_failures.saturating_add(1);
        self.record_error(ErrorKind::ConnectivityFailure, reason);
    }

    /// Overwrite the last error without touching request counters
    pub fn record_error<D: Display + ?Sized>(&mut self, kind: ErrorKind, reason: &D) {
        self.last_error.set(reason);
        self.last_error_kind = Some(kind);
    }

    /// Overwrite the last warning
    pub fn record_warning<D: Display + ?Sized>(&mut self, reason: &D) {
        self.last_warning.set(reason);
    }

    /// Update the mirrored servo attach state
    pub fn set_actuator_attached(&mut self, attached: bool) {
        self.actuator_attached = attached;
    }

    /// Record that the dial finished moving to `value`
    pub fn record_motion_complete(&mut self, value: f32) {
        self.last_accepted_value = Some(value);
        self.motions_completed = self.motions_completed.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let health = HealthTracker::new(250);
        assert_eq!(health.boot_ms(), 250);
        assert_eq!(health.last_accepted_value(), None);
        assert_eq!(health.successful_requests(), 0);
        assert_eq!(health.failed_requests(), 0);
        assert!(health.last_error().is_empty());
        assert!(!health.actuator_attached());
        assert_eq!(health.uptime_ms(1250), 1000);
    }

    #[test]
    fn test_poll_success() {
        let mut health = HealthTracker::new(0);
        health.record_poll_success(5000);
        assert_eq!(health.successful_requests(), 1);
        assert_eq!(health.last_successful_poll_ms(), Some(5000));
        assert_eq!(health.since_last_success_ms(8000), Some(3000));
    }

    #[test]
    fn test_poll_failure_overwrites_error() {
        let mut health = HealthTracker::new(0);
        health.record_poll_failure(ErrorKind::TransportFailure, "HTTP error: 500");
        health.record_poll_failure(ErrorKind::MissingField, "No 05. price in response");

        assert_eq!(health.failed_requests(), 2);
        assert_eq!(health.successful_requests(), 0);
        assert_eq!(health.last_error().as_str(), "No 05. price in response");
        assert_eq!(health.last_error_kind(), Some(ErrorKind::MissingField));
    }

    #[test]
    fn test_connectivity_failure_not_a_request() {
        let mut health = HealthTracker::new(0);
        health.record_connectivity_failure("Link down after 20 attempts");
        assert_eq!(health.connectivity_failures(), 1);
        assert_eq!(health.failed_requests(), 0);
        assert_eq!(
            health.last_error_kind(),
            Some(ErrorKind::ConnectivityFailure)
        );
    }

    #[test]
    fn test_long_error_is_bounded() {
        let mut health = HealthTracker::new(0);
        let long = "x".repeat(MESSAGE_CAPACITY * 2);
        health.record_error(ErrorKind::MalformedPayload, long.as_str());
        assert_eq!(health.last_error().len(), MESSAGE_CAPACITY);
        assert!(health.last_error().is_truncated());
    }

    #[test]
    fn test_counters_saturate() {
        let mut health = HealthTracker::new(0);
        health.failed_requests = u32::MAX;
        health.record_poll_failure(ErrorKind::TransportFailure, "HTTP timeout");
        assert_eq!(health.failed_requests(), u32::MAX);
    }

    #[test]
    fn test_motion_complete() {
        let mut health = HealthTracker::new(0);
        health.record_motion_complete(120.5);
        assert_eq!(health.last_accepted_value(), Some(120.5));
        assert_eq!(health.motions_completed(), 1);
    }
}
