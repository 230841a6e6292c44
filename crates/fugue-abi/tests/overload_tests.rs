//! Overload resolution tests for fugue-abi
//!
//! Covers name lookup per mutability path, arity and shape matching, and ties.

use fugue_abi::{
    decode_output, encode_call, resolve, Abi, AbiError, DecodedOutput, MutabilityClass, Value,
};
use fugue_primitives::Address;

const FOO_JSON: &str = r#"[
    {"type":"function","name":"foo","stateMutability":"view","inputs":[],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"foo","stateMutability":"view",
     "inputs":[{"name":"s","type":"string"}],"outputs":[{"name":"","type":"uint8"}]},
    {"type":"function","name":"foo","stateMutability":"view",
     "inputs":[{"name":"n","type":"uint256"}],"outputs":[{"name":"","type":"address"}]},
    {"type":"function","name":"bar","stateMutability":"view",
     "inputs":[{"name":"a","type":"address"}],"outputs":[{"name":"","type":"address"}]}
]"#;

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

fn foo_abi() -> Abi {
    Abi::from_json(FOO_JSON).unwrap()
}

// ==================== Scenario Tests ====================

#[test]
fn test_foo_with_integer_resolves_uint_overload() {
    let abi = foo_abi();
    let args = [Value::from(123u32)];
    let f = resolve(&abi, "foo", Some(&args), MutabilityClass::Read).unwrap();
    assert_eq!(f.signature(), "foo(uint256)");

    let data = encode_call(f, &args, None).unwrap();
    assert_eq!(&data[..4], &f.selector());
    assert_eq!(data[4 + 31], 123);

    let mut returned = [0u8; 32];
    returned[12..].copy_from_slice(Address::from_hex(VITALIK).unwrap().as_bytes());
    match decode_output(f, &returned).unwrap() {
        DecodedOutput::Single(Value::Address(a)) => {
            assert_eq!(a, Address::from_hex(VITALIK).unwrap())
        }
        other => panic!("expected single address, got {:?}", other),
    }
}

#[test]
fn test_bar_without_args_resolves_then_fails_encoding() {
    let abi = foo_abi();
    let f = resolve(&abi, "bar", None, MutabilityClass::Read).unwrap();
    assert_eq!(f.signature(), "bar(address)");

    let err = encode_call(f, &[], None).unwrap_err();
    assert_eq!(
        err,
        AbiError::ArgumentCount {
            function: "bar(address)".into(),
            expected: 1,
            supplied: 0,
        }
    );
}

// ==================== Arity Tests ====================

#[test]
fn test_arity_selects_overload() {
    let abi = Abi::parse_human(&[
        "function mint() returns (uint256)",
        "function mint(uint256 amount) returns (uint256)",
        "function mint(uint256 amount, address to) returns (uint256)",
    ])
    .unwrap();

    let cases: [(&[Value], &str); 3] = [
        (&[], "mint()"),
        (&[Value::from(1u8)], "mint(uint256)"),
        (&[Value::from(1u8), Value::from(VITALIK)], "mint(uint256,address)"),
    ];
    for (args, expected) in cases {
        let f = resolve(&abi, "mint", Some(args), MutabilityClass::Write).unwrap();
        assert_eq!(f.signature(), expected);
    }

    let four = [Value::from(1u8), Value::from(2u8), Value::from(3u8), Value::from(4u8)];
    assert!(matches!(
        resolve(&abi, "mint", Some(&four), MutabilityClass::Write),
        Err(AbiError::NoMatchingOverload { .. })
    ));
}

#[test]
fn test_single_function_accepts_any_argument_count() {
    let abi = foo_abi();
    for n in 0..4 {
        let args: Vec<Value> = (0..n).map(|i| Value::from(i as u64)).collect();
        let f = resolve(&abi, "bar", Some(&args), MutabilityClass::Read).unwrap();
        assert_eq!(f.name, "bar");
    }
}

// ==================== Mutability Path Tests ====================

#[test]
fn test_read_name_on_write_path() {
    let abi = foo_abi();
    let err = resolve(&abi, "foo", None, MutabilityClass::Write).unwrap_err();
    assert_eq!(
        err,
        AbiError::FunctionNotFound {
            name: "foo".into(),
            class: MutabilityClass::Write,
        }
    );
    assert_eq!(err.to_string(), "no state-mutating function named `foo` in ABI");
}

#[test]
fn test_overloads_split_across_paths() {
    let abi = Abi::parse_human(&[
        "function value() view returns (uint256)",
        "function value(uint256 v)",
    ])
    .unwrap();
    // each path sees one candidate, so arguments are not inspected
    let read = resolve(&abi, "value", Some(&[Value::from(1u8)]), MutabilityClass::Read).unwrap();
    assert_eq!(read.signature(), "value()");
    let write = resolve(&abi, "value", None, MutabilityClass::Write).unwrap();
    assert_eq!(write.signature(), "value(uint256)");
}

// ==================== Ambiguity Tests ====================

#[test]
fn test_integer_ambiguity() {
    let abi = Abi::parse_human(&[
        "function set(uint8 v)",
        "function set(int256 v)",
        "function set(string v)",
    ])
    .unwrap();
    match resolve(&abi, "set", Some(&[Value::from(7u8)]), MutabilityClass::Write) {
        Err(AbiError::AmbiguousOverload { name, candidates }) => {
            assert_eq!(name, "set");
            assert_eq!(candidates, vec!["set(uint8)", "set(int256)"]);
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_address_literal_against_address_and_bytes() {
    let abi = Abi::parse_human(&[
        "function check(address who) view returns (bool)",
        "function check(bytes data) view returns (bool)",
    ])
    .unwrap();

    // a 40-digit literal could be either
    let err = resolve(&abi, "check", Some(&[Value::from(VITALIK)]), MutabilityClass::Read)
        .unwrap_err();
    assert!(matches!(err, AbiError::AmbiguousOverload { .. }));

    // shorter hex only fits bytes
    let f = resolve(&abi, "check", Some(&[Value::from("0xdeadbeef")]), MutabilityClass::Read)
        .unwrap();
    assert_eq!(f.signature(), "check(bytes)");
}

#[test]
fn test_strings_and_arrays_widen() {
    let abi = Abi::parse_human(&[
        "function put(string key)",
        "function put(uint256[] keys)",
        "function put((address owner, uint64 id) entry)",
    ])
    .unwrap();

    let f = resolve(&abi, "put", Some(&[Value::from("k")]), MutabilityClass::Write).unwrap();
    assert_eq!(f.signature(), "put(string)");

    let list = Value::from(vec![Value::from(1u8), Value::from(2u8)]);
    let f = resolve(&abi, "put", Some(&[list]), MutabilityClass::Write).unwrap();
    assert_eq!(f.signature(), "put(uint256[])");

    let entry = Value::record([("id", Value::from(9u8)), ("owner", Value::from(VITALIK))]);
    let f = resolve(&abi, "put", Some(&[entry]), MutabilityClass::Write).unwrap();
    assert_eq!(f.signature(), "put((address,uint64))");
}

#[test]
fn test_no_match_reports_shapes() {
    let abi = foo_abi();
    let err = resolve(
        &abi,
        "foo",
        Some(&[Value::from(true), Value::from("x")]),
        MutabilityClass::Read,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no overload of `foo` accepts (bool,string); candidates: foo(), foo(string), foo(uint256)"
    );
}
