//! Reads against the OP-stack `GasPriceOracle` predeploy
//!
//! Estimates the L1 data fee a rollup transaction will be charged on top of
//! its L2 execution cost.

use fugue_abi::{Abi, AbiError, Value};
use fugue_primitives::{Address, U256};

use crate::client::Client;
use crate::contract::{read_contract, ReadContract};
use crate::types::BlockId;
use crate::ClientError;

/// Predeploy address of the oracle
pub const GAS_PRICE_ORACLE: Address = Address::from_bytes([
    0x42, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x0f,
]);

const ORACLE_ABI: &[&str] = &[
    "function l1BaseFee() view returns (uint256)",
    "function getL1GasUsed(bytes _data) view returns (uint256)",
    "function getL1Fee(bytes _data) view returns (uint256)",
];

/// Interface of the oracle functions read here
pub fn gas_price_oracle_abi() -> Result<Abi, AbiError> {
    Abi::parse_human(ORACLE_ABI)
}

/// Current L1 base fee
pub async fn l1_base_fee(client: &Client, block: BlockId) -> Result<U256, ClientError> {
    read_uint(client, "l1BaseFee", Vec::new(), block).await
}

/// L1 gas charged for posting `data`
///
/// `data` must be the serialized (RLP-encoded, unsigned) transaction, not its calldata.
pub async fn l1_gas_used(client: &Client, data: &[u8], block: BlockId) -> Result<U256, ClientError> {
    read_uint(client, "getL1GasUsed", vec![Value::Bytes(data.to_vec())], block).await
}

/// L1 fee in wei for posting `data`
///
/// `data` is the serialized transaction, as for [`l1_gas_used`].
pub async fn l1_fee(client: &Client, data: &[u8], block: BlockId) -> Result<U256, ClientError> {
    read_uint(client, "getL1Fee", vec![Value::Bytes(data.to_vec())], block).await
}

async fn read_uint(
    client: &Client,
    name: &str,
    args: Vec<Value>,
    block: BlockId,
) -> Result<U256, ClientError> {
    let abi = gas_price_oracle_abi()?;
    let request = ReadContract::new(GAS_PRICE_ORACLE, &abi, name)
        .args(args)
        .block(block);
    let output = read_contract(client, &request).await?;
    output
        .single()
        .and_then(Value::as_uint)
        .ok_or_else(|| ClientError::Serialization(format!("{} did not return a uint256", name)))
}
