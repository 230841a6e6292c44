//! Client error types

use fugue_abi::AbiError;
use thiserror::Error;

use crate::transport::TransportError;

/// Client error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Resolution, encoding or decoding failed
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The node or the connection to it failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Fields from more than one fee model were supplied
    #[error("conflicting fee fields: {}", fields.join(", "))]
    ConflictingFeeFields {
        /// The fields that cannot be combined
        fields: Vec<String>,
    },

    /// An EIP-1559 fee pair was only half supplied
    #[error("incomplete fee fields: {supplied} supplied without {missing}")]
    IncompleteFeeFields {
        /// The field that was supplied
        supplied: String,
        /// The field that is missing
        missing: String,
    },

    /// Invalid hex string in a node response
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<hex::FromHexError> for ClientError {
    fn from(e: hex::FromHexError) -> Self {
        ClientError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}
