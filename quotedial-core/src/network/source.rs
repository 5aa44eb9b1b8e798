//! Quote polling
//!
//! One request per call, no internal retry. Every outcome is written to
//! the health tracker before `poll` returns.

use core::fmt;

use quotedial_protocol::{parse_quote, QuoteError, QuoteRequest, RequestError, Url};

use crate::error::ErrorKind;
use crate::health::HealthTracker;
use crate::traits::{QuoteTransport, TransportError};
use crate::value::{Accepted, ClampWarning, Rejected, ValueValidator};

/// Response body buffer size
pub const BODY_CAPACITY: usize = 1024;

/// Why a poll produced no price
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollFailure {
    /// Request failed or returned a non-2xx status
    Transport(TransportError),
    /// Body could not be decoded into a price
    Payload(QuoteError),
    /// Price refused by the validator
    OutOfPolicy(Rejected),
}

impl PollFailure {
    /// Classify this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::Payload(QuoteError::Malformed(_) | QuoteError::InvalidNumber) => {
                ErrorKind::MalformedPayload
            }
            Self::Payload(QuoteError::MissingField(_) | QuoteError::Throttled) => {
                ErrorKind::MissingField
            }
            Self::OutOfPolicy(r) => r.kind(),
        }
    }
}

impl fmt::Display for PollFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{}", e),
            Self::Payload(e) => write!(f, "{}", e),
            Self::OutOfPolicy(e) => write!(f, "{}", e),
        }
    }
}

/// Polls the quote endpoint for one symbol
pub struct ValueSource {
    url: Url,
    timeout_ms: u32,
    validator: ValueValidator,
    body: [u8; BODY_CAPACITY],
}

impl ValueSource {
    pub fn new(
        request: &QuoteRequest,
        timeout_ms: u32,
        validator: ValueValidator,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            url: request.url()?,
            timeout_ms,
            validator,
            body: [0; BODY_CAPACITY],
        })
    }

    /// Perform one request and validate the price
    pub async fn poll<T: QuoteTransport>(
        &mut self,
        transport: &mut T,
        health: &mut HealthTracker,
        now_ms: u64,
    ) -> Result<Accepted, PollFailure> {
        let result = self.fetch(transport).await;
        match &result {
            Ok(accepted) => {
                health.record_poll_success(now_ms);
                if accepted.was_clamped() {
                    health.record_warning(&ClampWarning(accepted));
                }
            }
            Err(failure) => health.record_poll_failure(failure.kind(), failure),
        }
        result
    }

    async fn fetch<T: QuoteTransport>(&mut self, transport: &mut T) -> Result<Accepted, PollFailure> {
        let response = transport
            .get(&self.url, self.timeout_ms, &mut self.body)
            .await
            .map_err(PollFailure::Transport)?;

        if !response.is_success() {
            return Err(PollFailure::Transport(TransportError::Status(response.status)));
        }

        let len = response.body_len.min(self.body.len());
        let raw = parse_quote(&self.body[..len]).map_err(PollFailure::Payload)?;
        self.validator.validate(raw).map_err(PollFailure::OutOfPolicy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PriceRange, ValidationPolicy};
    use crate::testing::MockTransport;
    use embassy_futures::block_on;

    const QUOTE_152: &str =
        r#"{"Global Quote": {"01. symbol": "NVDA", "05. price": "152.3700", "07. latest trading day": "2024-06-14"}}"#;

    fn source() -> ValueSource {
        let request = QuoteRequest::new("NVDA", "DEMOKEY").unwrap();
        let validator = ValueValidator::new(PriceRange::new(95.0, 150.0), ValidationPolicy::default());
        ValueSource::new(&request, 6000, validator).unwrap()
    }

    #[test]
    fn test_clamped_success() {
        let mut source = source();
        let mut transport = MockTransport::new().respond(200, QUOTE_152);
        let mut health = HealthTracker::new(0);

        let accepted = block_on(source.poll(&mut transport, &mut health, 42)).unwrap();
        assert_eq!(accepted.value, 150.0);
        assert_eq!(accepted.raw(), 152.37);

        assert_eq!(health.successful_requests(), 1);
        assert_eq!(health.failed_requests(), 0);
        assert_eq!(health.last_successful_poll_ms(), Some(42));
        assert!(health.last_warning().contains("152.37"));
        assert!(health.last_error().is_empty());

        assert_eq!(transport.timeouts, vec![6000]);
        assert!(transport.urls[0].contains("symbol=NVDA"));
    }

    #[test]
    fn test_http_500() {
        let mut source = source();
        let mut transport = MockTransport::new().respond(500, "Internal Server Error");
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure, PollFailure::Transport(TransportError::Status(500)));
        assert_eq!(failure.kind(), ErrorKind::TransportFailure);
        assert_eq!(health.failed_requests(), 1);
        assert_eq!(health.successful_requests(), 0);
        assert!(health.last_error().contains("500"));
    }

    #[test]
    fn test_http_500_with_large_error_page() {
        let mut source = source();
        let page = "<html>".repeat(300);
        assert!(page.len() > BODY_CAPACITY);
        let mut transport = MockTransport::new().respond(500, page);
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure, PollFailure::Transport(TransportError::Status(500)));
        assert_eq!(health.last_error().as_str(), "HTTP error: 500");
    }

    #[test]
    fn test_oversized_quote_body() {
        let mut source = source();
        let mut transport = MockTransport::new().respond(200, " ".repeat(BODY_CAPACITY + 1));
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure, PollFailure::Transport(TransportError::BodyTooLarge));
        assert_eq!(health.failed_requests(), 1);
    }

    #[test]
    fn test_transport_error() {
        let mut source = source();
        let mut transport = MockTransport::new().fail(TransportError::Timeout);
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::TransportFailure);
        assert_eq!(health.last_error().as_str(), "HTTP timeout");
    }

    #[test]
    fn test_malformed_body() {
        let mut source = source();
        let mut transport = MockTransport::new().respond(200, "<html>");
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::MalformedPayload);
        assert_eq!(health.last_error_kind(), Some(ErrorKind::MalformedPayload));
    }

    #[test]
    fn test_missing_field() {
        let mut source = source();
        let mut transport = MockTransport::new().respond(200, r#"{"Global Quote": {}}"#);
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::MissingField);
        assert_eq!(health.last_error().as_str(), "No 05. price in response");
    }

    #[test]
    fn test_throttle_notice() {
        let mut source = source();
        let mut transport = MockTransport::new()
            .respond(200, r#"{"Note": "Thank you for using Alpha Vantage! Please retry later."}"#);
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure, PollFailure::Payload(QuoteError::Throttled));
        assert_eq!(failure.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_no_value_sentinel() {
        let mut source = source();
        let mut transport =
            MockTransport::new().respond(200, r#"{"Global Quote": {"05. price": "-1"}}"#);
        let mut health = HealthTracker::new(0);

        let failure = block_on(source.poll(&mut transport, &mut health, 0)).unwrap_err();
        assert_eq!(failure, PollFailure::OutOfPolicy(Rejected::NoValue));
        assert_eq!(failure.kind(), ErrorKind::OutOfPolicyValue);
        assert_eq!(health.last_error().as_str(), "No value available");
    }

    #[test]
    fn test_one_request_per_poll() {
        let mut source = source();
        let mut transport = MockTransport::new()
            .respond(503, "")
            .respond(200, QUOTE_152);
        let mut health = HealthTracker::new(0);

        assert!(block_on(source.poll(&mut transport, &mut health, 0)).is_err());
        assert_eq!(transport.requests(), 1);
        assert!(block_on(source.poll(&mut transport, &mut health, 0)).is_ok());
        assert_eq!(transport.requests(), 2);
        assert_eq!(health.failed_requests(), 1);
        assert_eq!(health.successful_requests(), 1);
    }
}
