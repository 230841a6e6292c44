//! Failure classification: whether retrying the same call could help

use std::fmt;

use crate::transport::TransportError;
use crate::ClientError;

/// HTTP statuses that may clear up on retry
pub const TRANSIENT_HTTP_STATUSES: [u16; 8] = [403, 408, 413, 429, 500, 502, 503, 504];

/// JSON-RPC error codes that may clear up on retry
pub const TRANSIENT_RPC_CODES: [i64; 5] = [-1, -32004, -32005, -32042, -32603];

/// Verdict on a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Fails the same way every time
    Deterministic,
    /// May succeed on retry
    Transient,
    /// No status or code to judge by
    Unknown,
}

impl FailureClass {
    /// Only transient failures are worth retrying; unknown fails closed
    pub fn is_retryable(self) -> bool {
        self == FailureClass::Transient
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureClass::Deterministic => "deterministic",
            FailureClass::Transient => "transient",
            FailureClass::Unknown => "unknown",
        })
    }
}

/// Classify any client error
///
/// Resolution, encoding, fee and response-shape errors are deterministic.
pub fn classify(error: &ClientError) -> FailureClass {
    match error {
        ClientError::Transport(e) => classify_transport(e),
        ClientError::Abi(_)
        | ClientError::ConflictingFeeFields { .. }
        | ClientError::IncompleteFeeFields { .. }
        | ClientError::InvalidHex(_)
        | ClientError::Serialization(_)
        | ClientError::Config(_) => FailureClass::Deterministic,
    }
}

/// Classify a transport failure by its status or code
pub fn classify_transport(error: &TransportError) -> FailureClass {
    match error {
        TransportError::Http { status, .. } if TRANSIENT_HTTP_STATUSES.contains(status) => {
            FailureClass::Transient
        }
        TransportError::Rpc { code, .. } if TRANSIENT_RPC_CODES.contains(code) => {
            FailureClass::Transient
        }
        TransportError::Http { .. } | TransportError::Rpc { .. } => FailureClass::Deterministic,
        TransportError::Network(_) => FailureClass::Unknown,
    }
}

impl ClientError {
    /// Shorthand for [`classify`]
    pub fn failure_class(&self) -> FailureClass {
        classify(self)
    }
}
