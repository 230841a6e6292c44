//! Contract call dispatch: resolve, encode, submit, decode

use bytes::Bytes;
use fugue_abi::{decode_output, encode_call, resolve, Abi, DecodedOutput, MutabilityClass, Value};
use fugue_primitives::{Address, U256};
use tracing::{debug, warn};

use crate::account::Account;
use crate::classify::classify;
use crate::client::Client;
use crate::fees::FeeFields;
use crate::types::{BlockId, CallRequest, PendingTransaction, TransactionRequest};
use crate::ClientError;

/// Query against a `pure` or `view` function
#[derive(Debug, Clone)]
pub struct ReadContract<'a> {
    /// Contract address
    pub address: Address,
    /// Contract interface
    pub abi: &'a Abi,
    /// Function name, possibly overloaded
    pub function_name: String,
    /// Arguments; `None` is the same as an empty list
    pub args: Option<Vec<Value>>,
    /// Block to read at
    pub block: BlockId,
    /// Caller identity seen by the contract
    pub caller: Option<Address>,
}

impl<'a> ReadContract<'a> {
    /// Query `function_name` on the contract at `address`
    pub fn new(address: Address, abi: &'a Abi, function_name: impl Into<String>) -> Self {
        Self {
            address,
            abi,
            function_name: function_name.into(),
            args: None,
            block: BlockId::Latest,
            caller: None,
        }
    }

    /// Set the arguments
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Read at a specific block
    pub fn block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }

    /// Set the caller identity
    pub fn caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }
}

/// Transaction against a `nonpayable` or `payable` function
#[derive(Debug, Clone)]
pub struct WriteContract<'a> {
    /// Contract address
    pub address: Address,
    /// Contract interface
    pub abi: &'a Abi,
    /// Function name, possibly overloaded
    pub function_name: String,
    /// Arguments; `None` is the same as an empty list
    pub args: Option<Vec<Value>>,
    /// Fee model fields
    pub fees: FeeFields,
    /// Value to transfer
    pub value: Option<U256>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Sender nonce
    pub nonce: Option<u64>,
    /// Opaque bytes appended after the encoded call
    pub data_suffix: Option<Bytes>,
}

impl<'a> WriteContract<'a> {
    /// Call `function_name` on the contract at `address`
    pub fn new(address: Address, abi: &'a Abi, function_name: impl Into<String>) -> Self {
        Self {
            address,
            abi,
            function_name: function_name.into(),
            args: None,
            fees: FeeFields::default(),
            value: None,
            gas: None,
            nonce: None,
            data_suffix: None,
        }
    }

    /// Set the arguments
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    /// Set the fee fields
    pub fn fees(mut self, fees: FeeFields) -> Self {
        self.fees = fees;
        self
    }

    /// Set the value to transfer
    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the gas limit
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Append `suffix` to the call data
    pub fn data_suffix(mut self, suffix: impl Into<Bytes>) -> Self {
        self.data_suffix = Some(suffix.into());
        self
    }
}

/// Run a read-only call and decode what it returns
///
/// Nothing is decoded unless the node answered; dropping the future before
/// that leaves no partial result behind.
pub async fn read_contract(
    client: &Client,
    request: &ReadContract<'_>,
) -> Result<DecodedOutput, ClientError> {
    let function = resolve(
        request.abi,
        &request.function_name,
        request.args.as_deref(),
        MutabilityClass::Read,
    )?;
    let data = encode_call(function, request.args.as_deref().unwrap_or(&[]), None)?;

    debug!(
        address = %request.address,
        function = %function.signature(),
        "dispatching read"
    );

    let call = CallRequest {
        from: request.caller,
        to: Some(request.address),
        data: Some(Bytes::from(data)),
    };
    let returned = client.call(&call, request.block).await.map_err(|e| {
        warn!(
            function = %function.signature(),
            class = %classify(&e),
            error = %e,
            "read failed"
        );
        e
    })?;

    Ok(decode_output(function, &returned)?)
}

/// Submit a state-mutating call and return its handle
///
/// Returns once the node accepts the transaction; confirmation is left to
/// the caller.
pub async fn write_contract(
    client: &Client,
    account: &dyn Account,
    request: &WriteContract<'_>,
) -> Result<PendingTransaction, ClientError> {
    let function = resolve(
        request.abi,
        &request.function_name,
        request.args.as_deref(),
        MutabilityClass::Write,
    )?;
    let data = encode_call(
        function,
        request.args.as_deref().unwrap_or(&[]),
        request.data_suffix.as_deref(),
    )?;
    let tx_type = request.fees.validate()?;

    let fees = &request.fees;
    let tx = TransactionRequest {
        from: account.address(),
        to: request.address,
        data: Bytes::from(data),
        value: request.value,
        gas: request.gas,
        nonce: request.nonce,
        gas_price: fees.gas_price,
        max_fee_per_gas: fees.max_fee_per_gas,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        access_list: fees.access_list.clone(),
        tx_type,
    };

    debug!(
        address = %request.address,
        function = %function.signature(),
        tx_type = ?tx_type,
        "dispatching write"
    );

    client.send_transaction(&tx).await.map_err(|e| {
        warn!(
            function = %function.signature(),
            class = %classify(&e),
            error = %e,
            "write failed"
        );
        e
    })
}
