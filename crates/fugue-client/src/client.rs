//! Client - JSON-RPC methods used by the dispatcher

use bytes::Bytes;
use fugue_primitives::H256;
use serde_json::Value;

use crate::transport::{MockTransport, Transport};
use crate::types::{BlockId, CallRequest, PendingTransaction, TransactionRequest};
use crate::ClientError;

#[cfg(feature = "http")]
use crate::config::ClientConfig;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Client for the node methods contract calls need
pub struct Client {
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client over HTTP from configuration
    #[cfg(feature = "http")]
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::with_transport(transport))
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Make an RPC request and deserialize the result
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError> {
        let value = self.transport.request_json(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        let result: String = self.request("eth_chainId", vec![]).await?;
        parse_hex_u64(&result)
    }

    /// Execute a read-only call
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, ClientError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Submit a transaction for the node to sign; returns once it is accepted
    pub async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<PendingTransaction, ClientError> {
        let result: String = self
            .request("eth_sendTransaction", vec![serde_json::to_value(request)?])
            .await?;
        let hash = H256::from_hex(&result).map_err(|e| ClientError::InvalidHex(e.to_string()))?;
        Ok(PendingTransaction::new(hash))
    }
}

fn parse_hex_u64(s: &str) -> Result<u64, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| ClientError::InvalidHex(e.to_string()))
}

fn parse_hex_bytes(s: &str) -> Result<Bytes, ClientError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(Bytes::from(hex::decode(s)?))
}
