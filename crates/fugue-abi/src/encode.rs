//! Call-data encoding

use fugue_primitives::{keccak256, Address, U256};
use tracing::debug;

use crate::function::Function;
use crate::param_type::ParamType;
use crate::token::{I256, Token};
use crate::value::{is_hex_literal, Value};
use crate::AbiError;

/// Encode a call: selector, arguments, then the optional opaque suffix
///
/// The suffix is appended verbatim after the ABI-defined payload.
pub fn encode_call(
    function: &Function,
    args: &[Value],
    data_suffix: Option<&[u8]>,
) -> Result<Vec<u8>, AbiError> {
    if args.len() != function.inputs.len() {
        return Err(AbiError::ArgumentCount {
            function: function.signature(),
            expected: function.inputs.len(),
            supplied: args.len(),
        });
    }

    let types = function.input_types();
    let mut data = function.selector().to_vec();
    data.extend(encode_values(&types, args)?);
    if let Some(suffix) = data_suffix {
        data.extend_from_slice(suffix);
    }

    debug!(
        function = %function.signature(),
        bytes = data.len(),
        suffix = data_suffix.map_or(0, <[u8]>::len),
        "encoded call"
    );
    Ok(data)
}

/// Encode values against their declared types, without a selector
pub fn encode_values(types: &[ParamType], values: &[Value]) -> Result<Vec<u8>, AbiError> {
    types.iter().try_for_each(ParamType::validate)?;
    if types.len() != values.len() {
        return Err(AbiError::TypeMismatch {
            declared: format!("{} values", types.len()),
            supplied: format!("{} values", values.len()),
        });
    }
    let tokens = types
        .iter()
        .zip(values)
        .map(|(ty, v)| tokenize(ty, v))
        .collect::<Result<Vec<_>, _>>()?;
    encode(types, &tokens)
}

/// Encode tokens against their declared types
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::TypeMismatch {
            declared: format!("{} values", types.len()),
            supplied: format!("{} values", tokens.len()),
        });
    }
    types.iter().try_for_each(ParamType::validate)?;
    encode_params(types.iter(), tokens)
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    keccak256(signature.as_bytes()).prefix4()
}

// ==================== Value -> Token ====================

/// Check a loose value against its declared type
pub fn tokenize(ty: &ParamType, value: &Value) -> Result<Token, AbiError> {
    let mismatch = || AbiError::TypeMismatch {
        declared: ty.to_string(),
        supplied: value.shape().to_string(),
    };

    match ty {
        ParamType::Uint(_) => match value {
            Value::Int(v) if v.is_negative() => Err(AbiError::EncodingRange {
                declared: ty.to_string(),
                value: v.to_string(),
            }),
            Value::Int(v) => Ok(Token::Uint(v.abs())),
            _ => Err(mismatch()),
        },
        ParamType::Int(_) => value.as_int().map(Token::Int).ok_or_else(mismatch),
        ParamType::Bool => value.as_bool().map(Token::Bool).ok_or_else(mismatch),
        ParamType::Address => value.as_address().map(Token::Address).ok_or_else(mismatch),
        ParamType::Bytes => Ok(Token::Bytes(byte_content(value)?.ok_or_else(mismatch)?)),
        ParamType::FixedBytes(_) => Ok(Token::FixedBytes(byte_content(value)?.ok_or_else(mismatch)?)),
        ParamType::String => match value {
            Value::String(s) => Ok(Token::String(s.clone())),
            _ => Err(mismatch()),
        },
        ParamType::Array(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|v| tokenize(inner, v))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array),
            _ => Err(mismatch()),
        },
        ParamType::FixedArray(inner, _) => match value {
            Value::Array(items) => items
                .iter()
                .map(|v| tokenize(inner, v))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::FixedArray),
            _ => Err(mismatch()),
        },
        ParamType::Tuple(params) => match value {
            Value::Array(items) if items.len() == params.len() => params
                .iter()
                .zip(items)
                .map(|(p, v)| tokenize(&p.kind, v))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple),
            Value::Record(fields) if fields.len() == params.len() => params
                .iter()
                .map(|p| {
                    let v = fields
                        .iter()
                        .find(|(name, _)| !p.name.is_empty() && *name == p.name)
                        .map(|(_, v)| v)
                        .ok_or_else(mismatch)?;
                    tokenize(&p.kind, v)
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple),
            _ => Err(mismatch()),
        },
    }
}

/// Bytes from a bytes value, a hex literal or an address
fn byte_content(value: &Value) -> Result<Option<Vec<u8>>, AbiError> {
    match value {
        Value::Bytes(b) => Ok(Some(b.clone())),
        Value::Address(a) => Ok(Some(a.as_bytes().to_vec())),
        Value::String(s) if is_hex_literal(s) => hex::decode(&s[2..])
            .map(Some)
            .map_err(|e| AbiError::InvalidValue(format!("{}: {}", s, e))),
        _ => Ok(None),
    }
}

// ==================== Token -> bytes ====================

/// Encode parameters: static values in the head, dynamic ones behind an offset
///
/// Each value is encoded before the head is laid out, so nested length
/// checks run before any offset is computed.
fn encode_params<'t>(
    types: impl Iterator<Item = &'t ParamType>,
    tokens: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let parts = types
        .zip(tokens)
        .map(|(param_type, token)| {
            encode_token(param_type, token).map(|bytes| (param_type.is_dynamic(), bytes))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Calculate head size (fixed part)
    let head_size: usize = parts
        .iter()
        .map(|(dynamic, bytes)| if *dynamic { 32 } else { bytes.len() })
        .sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (dynamic, bytes) in parts {
        if dynamic {
            // offset relative to the start of this block
            let offset = head_size + tail.len();
            head.extend(encode_u256(&U256::from(offset)));
            tail.extend(bytes);
        } else {
            head.extend(bytes);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    let out_of_range = |value: String| AbiError::EncodingRange {
        declared: param_type.to_string(),
        value,
    };

    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => Ok(encode_address(addr)),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(out_of_range(value.to_string()));
            }
            Ok(encode_u256(value))
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !int_fits(value, *bits) {
                return Err(out_of_range(value.to_string()));
            }
            Ok(encode_u256(&value.to_twos_complement()))
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            Ok(buf.to_vec())
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() > *size {
                return Err(out_of_range(format!("0x{}", hex::encode(data))));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = encode_u256(&U256::from(tokens.len()));
            result.extend(encode_params(std::iter::repeat(&**inner), tokens)?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens)) => {
            if tokens.len() != *size {
                return Err(out_of_range(format!("{} elements", tokens.len())));
            }
            encode_params(std::iter::repeat(&**inner), tokens)
        }
        (ParamType::Tuple(params), Token::Tuple(tokens)) if params.len() == tokens.len() => {
            encode_params(params.iter().map(|p| &p.kind), tokens)
        }
        _ => Err(AbiError::TypeMismatch {
            declared: param_type.to_string(),
            supplied: token_kind(token).to_string(),
        }),
    }
}

/// Whether `value` lies in the two's complement range of `bits`
fn int_fits(value: &I256, bits: usize) -> bool {
    let limit = match bits.checked_sub(1) {
        Some(shift) if shift < 256 => U256::one() << shift,
        _ => return false,
    };
    if value.is_negative() {
        value.abs() <= limit
    } else {
        value.abs() < limit
    }
}

fn token_kind(token: &Token) -> &'static str {
    match token {
        Token::Address(_) => "address",
        Token::Uint(_) => "uint",
        Token::Int(_) => "int",
        Token::Bool(_) => "bool",
        Token::Bytes(_) => "bytes",
        Token::FixedBytes(_) => "fixed bytes",
        Token::String(_) => "string",
        Token::Array(_) => "array",
        Token::FixedArray(_) => "fixed array",
        Token::Tuple(_) => "tuple",
    }
}

fn encode_address(addr: &Address) -> Vec<u8> {
    addr.to_word().to_vec()
}

/// Encode a U256 as 32 bytes
fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

/// Length word, then data right-padded to a multiple of 32
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}
