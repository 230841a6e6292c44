//! # fugue-client
//!
//! Contract read/write dispatch over JSON-RPC.
//!
//! ## Features
//!
//! - **read_contract**: resolve a `view`/`pure` function, `eth_call` it, decode the result
//! - **write_contract**: resolve a state-mutating function, validate fees, `eth_sendTransaction`
//! - **classify**: label a failure deterministic, transient or unknown
//! - **oracle**: L1 fee reads against the OP-stack gas price oracle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fugue_client::{read_contract, Abi, Client, ClientConfig, ReadContract, Value};
//! use fugue_client::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect(&ClientConfig::new("http://localhost:8545"))?;
//!
//!     let abi = Abi::parse_human(&["function balanceOf(address) view returns (uint256)"])?;
//!     let token = Address::from_hex("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")?;
//!     let owner = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")?;
//!
//!     let request = ReadContract::new(token, &abi, "balanceOf").args(vec![Value::Address(owner)]);
//!     let balance = read_contract(&client, &request).await?;
//!     println!("Balance: {:?}", balance);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Writing
//!
//! ```rust,no_run
//! use fugue_client::{write_contract, Abi, Client, FeeFields, Value, WriteContract};
//! use fugue_client::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new_mock();
//!     let abi = Abi::parse_human(&["function transfer(address to, uint256 amount) returns (bool)"])?;
//!     let sender = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")?;
//!
//!     let request = WriteContract::new(Address::ZERO, &abi, "transfer")
//!         .args(vec![Value::Address(sender), Value::from(1_000u64)])
//!         .fees(FeeFields::eip1559(30_000_000_000, 1_000_000_000))
//!         .data_suffix(vec![0xde, 0xad]);
//!     let pending = write_contract(&client, &sender, &request).await?;
//!     println!("Submitted: {}", pending.hash());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod classify;
mod client;
mod config;
mod contract;
mod error;
mod fees;
pub mod oracle;
mod transport;
pub mod types;

// Re-export main types
pub use account::Account;
pub use classify::{
    classify, classify_transport, FailureClass, TRANSIENT_HTTP_STATUSES, TRANSIENT_RPC_CODES,
};
pub use client::Client;
pub use config::ClientConfig;
pub use contract::{read_contract, write_contract, ReadContract, WriteContract};
pub use error::ClientError;
pub use fees::{FeeFields, TxKind};
pub use transport::{MockTransport, TransportError};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export the ABI layer and primitives for convenience
pub use fugue_abi::{Abi, AbiError, DecodedOutput, Function, MutabilityClass, Value};
pub use fugue_primitives::{Address, H256, U256};
