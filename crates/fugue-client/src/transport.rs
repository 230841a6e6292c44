//! Transport layer for RPC communication

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[cfg(feature = "http")]
use crate::config::ClientConfig;
#[cfg(feature = "http")]
use crate::ClientError;

/// Failure reported by a transport, with whatever status or code it carried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// JSON-RPC error object from the node
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Connection, timeout or protocol failure without a code
    #[error("network error: {0}")]
    Network(String),
}

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get JSON response
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;
}

/// Mock transport for testing
///
/// Answers from per-method canned responses or errors, then from defaults,
/// and records every request it sees.
#[derive(Clone)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    errors: Arc<Mutex<HashMap<String, TransportError>>>,
    default_responses: Arc<HashMap<String, Value>>,
    requests: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        defaults.insert("eth_chainId".to_string(), Value::String("0x1".to_string()));
        defaults.insert("eth_call".to_string(), Value::String("0x".to_string()));
        defaults.insert(
            "eth_sendTransaction".to_string(),
            Value::String(
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".to_string(),
            ),
        );

        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            errors: Arc::new(Mutex::new(HashMap::new())),
            default_responses: Arc::new(defaults),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a mock response for a specific method
    pub fn set_response(&self, method: &str, response: Value) {
        lock(&self.responses).insert(method.to_string(), response);
    }

    /// Make a specific method fail with `error`
    pub fn set_error(&self, method: &str, error: TransportError) {
        lock(&self.errors).insert(method.to_string(), error);
    }

    /// Clear custom responses and errors
    pub fn clear_responses(&self) {
        lock(&self.responses).clear();
        lock(&self.errors).clear();
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        lock(&self.requests).clone()
    }

    /// Requests received for one method
    pub fn requests_for(&self, method: &str) -> Vec<Vec<Value>> {
        lock(&self.requests)
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

// a panicking test thread must not hide later assertions
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        lock(&self.requests).push((method.to_string(), params));

        if let Some(error) = lock(&self.errors).get(method).cloned() {
            return Err(error);
        }

        // Check custom responses first
        if let Some(response) = lock(&self.responses).get(method).cloned() {
            return Ok(response);
        }

        // Fall back to defaults
        if let Some(response) = self.default_responses.get(method).cloned() {
            return Ok(response);
        }

        Err(TransportError::Rpc {
            code: -32601,
            message: format!("Method not found: {}", method),
        })
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport without a request timeout
    pub fn new(url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Create an HTTP transport from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self::with_client(client, &config.rpc_url))
    }

    fn with_client(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}
