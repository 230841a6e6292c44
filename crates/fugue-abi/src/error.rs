//! ABI error types

use thiserror::Error;

use crate::function::MutabilityClass;

/// Errors raised while loading an ABI, resolving a function, or running the codec.
///
/// Every variant is structural: retrying with the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// The ABI has no function with this name at all
    #[error("no function named `{name}` in ABI")]
    NotFound {
        /// Requested name
        name: String,
    },

    /// No function with this name in the requested mutability class
    #[error("no {class} function named `{name}` in ABI")]
    FunctionNotFound {
        /// Requested name
        name: String,
        /// Read or write path
        class: MutabilityClass,
    },

    /// The name is overloaded and no overload accepts the supplied arguments
    #[error("no overload of `{name}` accepts ({supplied}); candidates: {}", candidates.join(", "))]
    NoMatchingOverload {
        /// Requested name
        name: String,
        /// Widened shapes of the supplied arguments
        supplied: String,
        /// Signatures of every overload that was considered
        candidates: Vec<String>,
    },

    /// More than one overload accepts the supplied arguments
    #[error("ambiguous call to `{name}`: {} all accept the arguments", candidates.join(", "))]
    AmbiguousOverload {
        /// Requested name
        name: String,
        /// Signatures of the tied overloads
        candidates: Vec<String>,
    },

    /// Argument count differs from the function's input count
    #[error("{function} expects {expected} arguments, got {supplied}")]
    ArgumentCount {
        /// Canonical signature
        function: String,
        /// Declared input count
        expected: usize,
        /// Supplied argument count
        supplied: usize,
    },

    /// Value lies outside the declared type's domain
    #[error("value {value} out of range for {declared}")]
    EncodingRange {
        /// Declared type
        declared: String,
        /// Offending value
        value: String,
    },

    /// Value has the wrong shape for the declared type
    #[error("cannot encode {supplied} as {declared}")]
    TypeMismatch {
        /// Declared type
        declared: String,
        /// Shape of the supplied value
        supplied: String,
    },

    /// Payload too short, or an offset/length points outside it
    #[error("insufficient data: need {required} bytes, have {available}")]
    DecodingLength {
        /// Bytes required
        required: usize,
        /// Bytes available
        available: usize,
    },

    /// Decoded string is not UTF-8
    #[error("invalid UTF-8 in decoded string: {0}")]
    InvalidUtf8(String),

    /// Call data does not start with the function's selector
    #[error("selector mismatch: expected 0x{expected}, got 0x{actual}")]
    SelectorMismatch {
        /// Selector of the function (hex)
        expected: String,
        /// Leading bytes of the data (hex)
        actual: String,
    },

    /// Unknown or malformed type string
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Malformed human-readable signature
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Malformed ABI description
    #[error("invalid ABI: {0}")]
    InvalidAbi(String),

    /// Argument value cannot be represented (e.g. a fractional JSON number)
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidAbi(e.to_string())
    }
}
