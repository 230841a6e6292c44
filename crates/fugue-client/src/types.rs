//! RPC request and response types

use bytes::Bytes;
use fugue_primitives::{Address, H256, U256};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::fees::TxKind;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
    /// Safe block
    Safe,
    /// Finalized block
    Finalized,
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&quantity(n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
            BlockId::Safe => serializer.serialize_str("safe"),
            BlockId::Finalized => serializer.serialize_str("finalized"),
        }
    }
}

/// Read-only call for `eth_call`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller identity, for contracts that read `msg.sender`
    pub from: Option<Address>,
    /// Contract address
    pub to: Option<Address>,
    /// Call data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &hex_data(data))?;
        }
        map.end()
    }
}

/// One access-list entry: an address and the storage slots it touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Accessed contract
    pub address: Address,
    /// Accessed storage slots
    pub storage_keys: Vec<H256>,
}

/// State-mutating transaction for `eth_sendTransaction`
///
/// Signed by the node for the `from` account. Fee fields are validated
/// before a request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sender
    pub from: Address,
    /// Contract address
    pub to: Address,
    /// Call data, including any suffix
    pub data: Bytes,
    /// Value to transfer
    pub value: Option<U256>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Sender nonce
    pub nonce: Option<u64>,
    /// Gas price (legacy, EIP-2930)
    pub gas_price: Option<u128>,
    /// Max fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<u128>,
    /// Access list (EIP-2930, EIP-1559)
    pub access_list: Option<Vec<AccessListItem>>,
    /// Envelope type; left to the node when absent
    pub tx_type: Option<TxKind>,
}

impl Serialize for TransactionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("from", &self.from.to_hex())?;
        map.serialize_entry("to", &self.to.to_hex())?;
        map.serialize_entry("data", &hex_data(&self.data))?;
        if let Some(value) = &self.value {
            map.serialize_entry("value", &quantity(value))?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &quantity(gas))?;
        }
        if let Some(nonce) = &self.nonce {
            map.serialize_entry("nonce", &quantity(nonce))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &quantity(gas_price))?;
        }
        if let Some(max_fee) = &self.max_fee_per_gas {
            map.serialize_entry("maxFeePerGas", &quantity(max_fee))?;
        }
        if let Some(max_priority) = &self.max_priority_fee_per_gas {
            map.serialize_entry("maxPriorityFeePerGas", &quantity(max_priority))?;
        }
        if let Some(access_list) = &self.access_list {
            map.serialize_entry("accessList", access_list)?;
        }
        if let Some(kind) = &self.tx_type {
            map.serialize_entry("type", &quantity(kind.type_byte()))?;
        }
        map.end()
    }
}

/// Pending transaction handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Transaction hash
    pub hash: H256,
}

impl PendingTransaction {
    /// Create a new pending transaction
    pub fn new(hash: H256) -> Self {
        Self { hash }
    }

    /// Get the transaction hash
    pub fn hash(&self) -> &H256 {
        &self.hash
    }
}

/// JSON-RPC quantity: minimal hex with `0x` prefix
fn quantity<T: std::fmt::LowerHex>(value: T) -> String {
    format!("0x{:x}", value)
}

fn hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}
