//! Connectivity guard
//!
//! Joins the network when the link is down and waits a bounded number of
//! attempts for it to come up. The watchdog is fed on every attempt.

use embedded_hal_async::delay::DelayNs;

use crate::config::LinkPolicy;
use crate::health::HealthTracker;
use crate::traits::{Credentials, LinkError, NetworkLink, Watchdog};

/// Keeps the network link up ahead of each poll
#[derive(Debug, Clone)]
pub struct ConnectivityGuard {
    credentials: Credentials,
    policy: LinkPolicy,
}

impl ConnectivityGuard {
    pub fn new(credentials: Credentials, policy: LinkPolicy) -> Self {
        Self {
            credentials,
            policy,
        }
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// Make sure the link is up
    ///
    /// Returns `false` after recording a connectivity failure when the link
    /// did not come up within the attempt budget. The caller skips the rest
    /// of the cycle.
    pub async fn ensure_connected<L, D, W>(
        &self,
        link: &mut L,
        delay: &mut D,
        watchdog: &mut W,
        health: &mut HealthTracker,
    ) -> bool
    where
        L: NetworkLink,
        D: DelayNs,
        W: Watchdog,
    {
        watchdog.feed();
        if link.is_connected() {
            return true;
        }

        if let Err(e) = link.begin(&self.credentials).await {
            health.record_connectivity_failure(&e);
            return false;
        }

        for _ in 0..self.policy.max_attempts {
            watchdog.feed();
            if link.is_connected() {
                return true;
            }
            delay.delay_ms(self.policy.attempt_delay_ms).await;
        }

        watchdog.feed();
        if link.is_connected() {
            return true;
        }

        health.record_connectivity_failure(&LinkError::Timeout {
            attempts: self.policy.max_attempts,
        });
        false
    }
}
