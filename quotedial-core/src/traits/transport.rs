//! HTTPS transport trait

/// Errors that can occur fetching a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Server answered with a non-2xx status
    Status(u16),
    /// Request did not finish within the timeout
    Timeout,
    /// TCP connection failed
    Connect,
    /// Host name did not resolve
    Dns,
    /// TLS handshake or record error
    Tls,
    /// Body larger than the receive buffer
    BodyTooLarge,
    /// Request could not be written
    Request,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP error: {}", code),
            Self::Timeout => f.write_str("HTTP timeout"),
            Self::Connect => f.write_str("HTTP connect failed"),
            Self::Dns => f.write_str("DNS lookup failed"),
            Self::Tls => f.write_str("TLS error"),
            Self::BodyTooLarge => f.write_str("Response body too large"),
            Self::Request => f.write_str("HTTP request failed"),
        }
    }
}

/// Status and body length of a completed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Bytes of body written into the caller's buffer
    pub body_len: usize,
}

impl HttpResponse {
    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for a bounded HTTPS GET client
#[allow(async_fn_in_trait)]
pub trait QuoteTransport {
    /// Fetch `url`, writing the body into `body`
    ///
    /// Must give up after `timeout_ms`. Non-2xx responses are returned as
    /// `Ok` so the caller can classify the status.
    async fn get(
        &mut self,
        url: &str,
        timeout_ms: u32,
        body: &mut [u8],
    ) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        assert_eq!(format!("{}", TransportError::Status(500)), "HTTP error: 500");
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse { status: 204, body_len: 0 };
        let err = HttpResponse { status: 302, body_len: 0 };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
