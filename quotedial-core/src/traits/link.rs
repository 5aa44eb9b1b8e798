//! Network link trait

use heapless::String;

/// Maximum SSID length (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Wi-Fi network credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    ssid: String<MAX_SSID_LEN>,
    password: String<MAX_PASSWORD_LEN>,
}

impl Credentials {
    /// Create credentials, rejecting over-long values
    pub fn new(ssid: &str, password: &str) -> Result<Self, LinkError> {
        let ssid = String::try_from(ssid).map_err(|_| LinkError::CredentialsTooLong)?;
        let password = String::try_from(password).map_err(|_| LinkError::CredentialsTooLong)?;
        Ok(Self { ssid, password })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep the passphrase out of logs
impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Credentials {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Credentials {{ ssid: {=str} }}", self.ssid.as_str())
    }
}

/// Errors that can occur bringing the link up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// SSID or passphrase exceeds the radio's limits
    CredentialsTooLong,
    /// Radio rejected the join request
    JoinFailed,
    /// Link did not come up within the attempt budget
    Timeout { attempts: u8 },
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CredentialsTooLong => f.write_str("Wi-Fi credentials too long"),
            Self::JoinFailed => f.write_str("Wi-Fi join failed"),
            Self::Timeout { attempts } => {
                write!(f, "Wi-Fi not connected after {} attempts", attempts)
            }
        }
    }
}

/// Trait for the station-mode network link
#[allow(async_fn_in_trait)]
pub trait NetworkLink {
    /// Check if the link is up and has an address
    fn is_connected(&self) -> bool;

    /// Start joining the network
    ///
    /// Returns once the join has been issued; the caller polls
    /// `is_connected` to learn when the link is usable.
    async fn begin(&mut self, credentials: &Credentials) -> Result<(), LinkError>;
}
