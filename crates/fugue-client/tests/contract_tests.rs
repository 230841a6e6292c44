//! Dispatcher tests for fugue-client
//!
//! Drives read_contract / write_contract end to end over MockTransport.

use std::time::Duration;

use async_trait::async_trait;
use fugue_client::oracle::{l1_fee, l1_gas_used, GAS_PRICE_ORACLE};
use fugue_client::types::{AccessListItem, BlockId};
use fugue_client::{
    read_contract, write_contract, Abi, AbiError, Address, Client, ClientError, DecodedOutput,
    FeeFields, MockTransport, ReadContract, Transport, TransportError, TxKind, Value,
    WriteContract, H256, U256,
};
use proptest::prelude::*;
use serde_json::Value as Json;

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

fn foo_abi() -> Abi {
    Abi::parse_human(&[
        "function foo() view returns (bool)",
        "function foo(string) view returns (uint8)",
        "function foo(uint256) view returns (address)",
        "function bar(address) view returns (address)",
        "function store(uint256 value) payable",
        "function setOwner(address owner)",
    ])
    .unwrap()
}

fn word_hex(bytes: &[u8]) -> Json {
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    Json::String(format!("0x{}", hex::encode(word)))
}

fn contract() -> Address {
    Address::from_bytes([0xc0; 20])
}

// RUST_LOG=fugue_client=debug shows dispatch logs
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ==================== Read Path ====================

#[tokio::test]
async fn test_read_foo_overload_returns_address() {
    init_tracing();
    let abi = foo_abi();
    let vitalik = Address::from_hex(VITALIK).unwrap();
    let transport = MockTransport::new();
    transport.set_response("eth_call", word_hex(vitalik.as_bytes()));
    let client = Client::with_transport(transport.clone());

    let request = ReadContract::new(contract(), &abi, "foo").args(vec![Value::from(123u32)]);
    let out = read_contract(&client, &request).await.unwrap();
    assert_eq!(out, DecodedOutput::Single(Value::Address(vitalik)));

    let calls = transport.requests_for("eth_call");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0]["to"], contract().to_hex());
    assert_eq!(calls[0][1], "latest");

    let data = calls[0][0]["data"].as_str().unwrap();
    let f = abi.functions().find(|f| f.signature() == "foo(uint256)").unwrap();
    assert!(data.starts_with(&format!("0x{}", hex::encode(f.selector()))));
    assert!(data.ends_with("7b"));
}

#[tokio::test]
async fn test_read_without_args_picks_nullary_overload() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    transport.set_response("eth_call", word_hex(&[1]));
    let client = Client::with_transport(transport);

    let out = read_contract(&client, &ReadContract::new(contract(), &abi, "foo"))
        .await
        .unwrap();
    assert_eq!(out.single(), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn test_read_bar_without_args_is_argument_count() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    let client = Client::with_transport(transport.clone());

    let err = read_contract(&client, &ReadContract::new(contract(), &abi, "bar"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Abi(AbiError::ArgumentCount {
            function: "bar(address)".into(),
            expected: 1,
            supplied: 0,
        })
    );
    // nothing reaches the node after a structural failure
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_read_short_return_data_is_decoding_length() {
    let abi = foo_abi();
    let client = Client::new_mock(); // eth_call answers "0x"

    let request = ReadContract::new(contract(), &abi, "bar")
        .args(vec![Value::from(VITALIK)]);
    let err = read_contract(&client, &request).await.unwrap_err();
    assert!(matches!(err, ClientError::Abi(AbiError::DecodingLength { .. })));
}

#[tokio::test]
async fn test_read_transport_error_propagates() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    transport.set_error("eth_call", TransportError::Http { status: 429, body: "slow down".into() });
    let client = Client::with_transport(transport);

    let request = ReadContract::new(contract(), &abi, "foo").args(vec![Value::from(1u8)]);
    let err = read_contract(&client, &request).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Transport(TransportError::Http { status: 429, body: "slow down".into() })
    );
    assert!(err.failure_class().is_retryable());
}

// ==================== Write Path ====================

#[tokio::test]
async fn test_write_sends_suffixed_data_and_fee_fields() {
    init_tracing();
    let abi = foo_abi();
    let sender = Address::from_hex(VITALIK).unwrap();
    let transport = MockTransport::new();
    let client = Client::with_transport(transport.clone());

    let request = WriteContract::new(contract(), &abi, "store")
        .args(vec![Value::from(42u64)])
        .fees(FeeFields::eip1559(30_000_000_000, 1_000_000_000))
        .value(U256::from(5))
        .gas(100_000)
        .nonce(3)
        .data_suffix(vec![0xca, 0xfe]);
    let pending = write_contract(&client, &sender, &request).await.unwrap();
    assert_eq!(
        *pending.hash(),
        H256::from_hex("0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b")
            .unwrap()
    );

    let sent = &transport.requests_for("eth_sendTransaction")[0][0];
    assert_eq!(sent["from"], sender.to_hex());
    assert_eq!(sent["to"], contract().to_hex());
    assert_eq!(sent["value"], "0x5");
    assert_eq!(sent["gas"], "0x186a0");
    assert_eq!(sent["nonce"], "0x3");
    assert_eq!(sent["maxFeePerGas"], "0x6fc23ac00");
    assert_eq!(sent["maxPriorityFeePerGas"], "0x3b9aca00");
    assert_eq!(sent["type"], "0x2");
    assert!(sent.get("gasPrice").is_none());

    // selector + one word + suffix
    let data = sent["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + 2 * (4 + 32 + 2));
    assert!(data.ends_with("2acafe"));
}

#[tokio::test]
async fn test_write_eip2930_carries_access_list() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    let client = Client::with_transport(transport.clone());

    let item = AccessListItem { address: contract(), storage_keys: vec![H256::ZERO] };
    let request = WriteContract::new(contract(), &abi, "setOwner")
        .args(vec![Value::from(VITALIK)])
        .fees(FeeFields::eip2930(7, vec![item]));
    write_contract(&client, &Address::ZERO, &request).await.unwrap();

    let sent = &transport.requests_for("eth_sendTransaction")[0][0];
    assert_eq!(sent["gasPrice"], "0x7");
    assert_eq!(sent["type"], "0x1");
    assert_eq!(sent["accessList"][0]["address"], contract().to_hex());
}

#[tokio::test]
async fn test_write_without_fees_leaves_pricing_to_node() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    let client = Client::with_transport(transport.clone());

    let request = WriteContract::new(contract(), &abi, "setOwner").args(vec![Value::from(VITALIK)]);
    write_contract(&client, &Address::ZERO, &request).await.unwrap();

    let sent = &transport.requests_for("eth_sendTransaction")[0][0];
    for field in ["gasPrice", "maxFeePerGas", "maxPriorityFeePerGas", "type"] {
        assert!(sent.get(field).is_none(), "{} should be absent", field);
    }
}

#[tokio::test]
async fn test_write_rejects_view_function() {
    let abi = foo_abi();
    let client = Client::new_mock();
    let request = WriteContract::new(contract(), &abi, "bar").args(vec![Value::from(VITALIK)]);
    let err = write_contract(&client, &Address::ZERO, &request).await.unwrap_err();
    assert!(matches!(err, ClientError::Abi(AbiError::FunctionNotFound { .. })));
}

#[tokio::test]
async fn test_write_incomplete_1559_pair() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    let client = Client::with_transport(transport.clone());

    let request = WriteContract::new(contract(), &abi, "setOwner")
        .args(vec![Value::from(VITALIK)])
        .fees(FeeFields::default().max_priority_fee_per_gas(1));
    let err = write_contract(&client, &Address::ZERO, &request).await.unwrap_err();
    assert!(matches!(err, ClientError::IncompleteFeeFields { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_write_rpc_error_propagates() {
    init_tracing();
    let abi = foo_abi();
    let transport = MockTransport::new();
    transport.set_error(
        "eth_sendTransaction",
        TransportError::Rpc { code: -32000, message: "insufficient funds".into() },
    );
    let client = Client::with_transport(transport);

    let request = WriteContract::new(contract(), &abi, "setOwner")
        .args(vec![Value::from(VITALIK)])
        .fees(FeeFields::legacy(1));
    let err = write_contract(&client, &Address::ZERO, &request).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Rpc { code: -32000, .. })));
    assert!(!err.failure_class().is_retryable());
}

// ==================== Cancellation ====================

struct PendingTransport;

#[async_trait]
impl Transport for PendingTransport {
    async fn request_json(&self, _method: &str, _params: Vec<Json>) -> Result<Json, TransportError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_read_returns_nothing() {
    let abi = foo_abi();
    let client = Client::with_transport(PendingTransport);
    let request = ReadContract::new(contract(), &abi, "foo").args(vec![Value::from(1u8)]);

    let outcome = tokio::time::timeout(Duration::from_millis(20), read_contract(&client, &request)).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_concurrent_reads_share_abi() {
    let abi = foo_abi();
    let transport = MockTransport::new();
    transport.set_response("eth_call", word_hex(&[9]));
    let client = Client::with_transport(transport.clone());

    let first = ReadContract::new(contract(), &abi, "foo").args(vec![Value::from("a")]);
    let second = ReadContract::new(contract(), &abi, "foo").args(vec![Value::from("b")]);
    let (a, b) = tokio::join!(read_contract(&client, &first), read_contract(&client, &second));
    assert_eq!(a.unwrap().single().and_then(Value::as_uint), Some(U256::from(9)));
    assert_eq!(b.unwrap().single().and_then(Value::as_uint), Some(U256::from(9)));
    assert_eq!(transport.requests_for("eth_call").len(), 2);
}

// ==================== Oracle ====================

#[tokio::test]
async fn test_oracle_fee_reads_encode_payload() {
    let transport = MockTransport::new();
    transport.set_response("eth_call", word_hex(&[0x10, 0x00]));
    let client = Client::with_transport(transport.clone());

    let payload = [0xab; 40];
    assert_eq!(
        l1_gas_used(&client, &payload, BlockId::Latest).await.unwrap(),
        U256::from(4096)
    );
    assert_eq!(
        l1_fee(&client, &payload, BlockId::Number(1)).await.unwrap(),
        U256::from(4096)
    );

    let calls = transport.requests_for("eth_call");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][0]["to"], GAS_PRICE_ORACLE.to_hex());
    // selector, offset, length, two padded words of payload
    let data = calls[0][0]["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + 2 * (4 + 32 * 4));
    assert_eq!(calls[1][1], "0x1");
}

// ==================== Properties ====================

#[derive(Debug, Clone, Copy)]
enum FeeStep {
    GasPrice,
    MaxFee,
    MaxPriority,
    AccessList,
    Type(TxKind),
}

fn apply(fees: FeeFields, step: FeeStep) -> FeeFields {
    match step {
        FeeStep::GasPrice => fees.gas_price(1),
        FeeStep::MaxFee => fees.max_fee_per_gas(2),
        FeeStep::MaxPriority => fees.max_priority_fee_per_gas(1),
        FeeStep::AccessList => fees.access_list(Vec::new()),
        FeeStep::Type(kind) => fees.tx_type(kind),
    }
}

fn arb_steps() -> impl Strategy<Value = Vec<FeeStep>> {
    let optional = prop::sample::subsequence(
        vec![
            FeeStep::MaxPriority,
            FeeStep::AccessList,
            FeeStep::Type(TxKind::Legacy),
        ],
        0..=3,
    );
    optional
        .prop_map(|mut steps| {
            steps.push(FeeStep::GasPrice);
            steps.push(FeeStep::MaxFee);
            steps
        })
        .prop_shuffle()
}

proptest! {
    #[test]
    fn prop_gas_price_with_max_fee_always_conflicts(steps in arb_steps()) {
        let fees = steps.iter().fold(FeeFields::default(), |f, s| apply(f, *s));
        let abi = foo_abi();
        let transport = MockTransport::new();
        let client = Client::with_transport(transport.clone());
        let request = WriteContract::new(contract(), &abi, "setOwner")
            .args(vec![Value::from(VITALIK)])
            .fees(fees);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(write_contract(&client, &Address::ZERO, &request));
        prop_assert!(
            matches!(result, Err(ClientError::ConflictingFeeFields { .. })),
            "unexpected outcome: {:?}",
            result
        );
        prop_assert!(transport.requests().is_empty());
    }
}
