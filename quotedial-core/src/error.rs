//! Error classification
//!
//! Every failure the dial can hit falls into one of these kinds. Component
//! errors carry more detail and map onto a kind via their `kind()` method.

/// Types of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Network link could not be established
    ConnectivityFailure,
    /// Request failed in transport or returned a non-success status
    TransportFailure,
    /// Response body could not be parsed
    MalformedPayload,
    /// Response parsed but the price was absent
    MissingField,
    /// Price rejected by the validator
    OutOfPolicyValue,
    /// Servo driver refused an operation
    ActuatorFault,
    /// Pulse range is empty or inverted
    InvalidCommandRange,
    /// Any other startup configuration invariant violated
    InvalidConfig,
}

impl ErrorKind {
    /// Fatal kinds stop the dial before the first poll
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidCommandRange | Self::InvalidConfig)
    }

    /// Short label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConnectivityFailure => "connectivity",
            Self::TransportFailure => "transport",
            Self::MalformedPayload => "malformed payload",
            Self::MissingField => "missing field",
            Self::OutOfPolicyValue => "out of policy",
            Self::ActuatorFault => "actuator",
            Self::InvalidCommandRange => "invalid command range",
            Self::InvalidConfig => "invalid config",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
