//! Return-data and call-data decoding

use fugue_primitives::{Address, U256};
use tracing::debug;

use crate::function::Function;
use crate::param_type::{Param, ParamType};
use crate::token::{I256, Token};
use crate::value::Value;
use crate::AbiError;

/// Decoded return value of a call
///
/// Keeps "no outputs", "one output" and "several outputs" apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOutput {
    /// The function declares no outputs
    None,
    /// Exactly one declared output
    Single(Value),
    /// Two or more outputs, in declaration order
    Multiple(Vec<Value>),
}

impl DecodedOutput {
    /// The value of a single-output function
    pub fn single(&self) -> Option<&Value> {
        match self {
            DecodedOutput::Single(v) => Some(v),
            _ => None,
        }
    }

    /// True when the function declares no outputs
    pub fn is_none(&self) -> bool {
        matches!(self, DecodedOutput::None)
    }

    /// Flatten into declaration-ordered values
    pub fn into_values(self) -> Vec<Value> {
        match self {
            DecodedOutput::None => Vec::new(),
            DecodedOutput::Single(v) => vec![v],
            DecodedOutput::Multiple(values) => values,
        }
    }
}

/// Decode the return data of `function`
pub fn decode_output(function: &Function, data: &[u8]) -> Result<DecodedOutput, AbiError> {
    if function.outputs.is_empty() {
        return Ok(DecodedOutput::None);
    }

    let mut values = decode_values(&function.outputs, data)?;
    debug!(
        function = %function.signature(),
        bytes = data.len(),
        outputs = values.len(),
        "decoded output"
    );

    if values.len() == 1 {
        Ok(DecodedOutput::Single(values.remove(0)))
    } else {
        Ok(DecodedOutput::Multiple(values))
    }
}

/// Decode call data produced for `function` back into its arguments
pub fn decode_function_data(function: &Function, calldata: &[u8]) -> Result<Vec<Value>, AbiError> {
    check_length(calldata, 4)?;
    let expected = function.selector();
    if calldata[..4] != expected {
        return Err(AbiError::SelectorMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(&calldata[..4]),
        });
    }
    decode_values(&function.inputs, &calldata[4..])
}

/// Decode a parameter block into values, naming tuple components where declared
pub fn decode_values(params: &[Param], data: &[u8]) -> Result<Vec<Value>, AbiError> {
    let types: Vec<ParamType> = params.iter().map(|p| p.kind.clone()).collect();
    let tokens = decode(&types, data)?;
    Ok(types
        .iter()
        .zip(tokens)
        .map(|(ty, token)| to_value(ty, token))
        .collect())
}

/// Decode tokens from ABI-encoded data
///
/// Offsets may point anywhere in their block, including at a tail another
/// value already uses. The decoded values may reference at most
/// `REUSE_LIMIT` times the payload length in total; past that the payload
/// fails with [`AbiError::DecodingLength`].
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    types.iter().try_for_each(ParamType::validate)?;
    let head_size = types
        .iter()
        .try_fold(0usize, |acc, ty| acc.checked_add(ty.checked_head_length()?))
        .ok_or_else(|| too_long(data.len()))?;
    let mut budget = Budget::new(data.len());
    decode_params(types.iter(), types.len(), head_size, data, &mut budget)
}

/// How many times over a payload's bytes may be referenced while decoding
const REUSE_LIMIT: usize = 2;

/// Bytes of decoded content still allowed
struct Budget {
    limit: usize,
    used: usize,
}

impl Budget {
    fn new(payload_len: usize) -> Self {
        Self {
            limit: payload_len.saturating_mul(REUSE_LIMIT),
            used: 0,
        }
    }

    fn charge(&mut self, bytes: usize) -> Result<(), AbiError> {
        let used = self.used.saturating_add(bytes);
        if used > self.limit {
            return Err(AbiError::DecodingLength {
                required: used,
                available: self.limit,
            });
        }
        self.used = used;
        Ok(())
    }
}

/// Decode a block of `count` values whose heads take `head_size` bytes
///
/// Dynamic values sit behind offsets relative to the start of `block`.
fn decode_params<'t>(
    types: impl Iterator<Item = &'t ParamType>,
    count: usize,
    head_size: usize,
    block: &[u8],
    budget: &mut Budget,
) -> Result<Vec<Token>, AbiError> {
    check_length(block, head_size)?;

    let mut tokens = Vec::with_capacity(count);
    let mut offset = 0;
    for param_type in types {
        let token = if param_type.is_dynamic() {
            let tail = read_usize(block, offset)?;
            if tail > block.len() {
                return Err(AbiError::DecodingLength {
                    required: tail,
                    available: block.len(),
                });
            }
            decode_at(param_type, &block[tail..], budget)?
        } else {
            decode_at(param_type, &block[offset..], budget)?
        };
        tokens.push(token);
        offset += param_type.head_length();
    }
    Ok(tokens)
}

/// Decode one value whose encoding starts at `data[0]`
fn decode_at(param_type: &ParamType, data: &[u8], budget: &mut Budget) -> Result<Token, AbiError> {
    match param_type {
        ParamType::Address => {
            let word = read_leaf(data, budget)?;
            let mut addr_bytes = [0u8; 20];
            addr_bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from_bytes(addr_bytes)))
        }
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(read_leaf(data, budget)?))),
        ParamType::Int(bits) => {
            let word = U256::from_big_endian(read_leaf(data, budget)?);
            Ok(Token::Int(I256::from_twos_complement(word, *bits)))
        }
        ParamType::Bool => Ok(Token::Bool(read_leaf(data, budget)?.iter().any(|b| *b != 0))),
        ParamType::FixedBytes(size) => {
            let word = read_leaf(data, budget)?;
            let size = (*size).min(32);
            Ok(Token::FixedBytes(word[..size].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(decode_bytes(data, budget)?.to_vec())),
        ParamType::String => {
            let bytes = decode_bytes(data, budget)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|e| AbiError::InvalidUtf8(e.to_string()))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, 0)?;
            budget.charge(32)?;
            let elements = &data[32..];
            // every element needs at least its head; zero-sized ones count a byte
            let required = len
                .checked_mul(inner.head_length().max(1))
                .ok_or_else(|| too_long(elements.len()))?;
            decode_params(
                std::iter::repeat(&**inner).take(len),
                len,
                required,
                elements,
                budget,
            )
            .map(Token::Array)
        }
        ParamType::FixedArray(inner, size) => {
            // dynamic elements still need an offset word each
            let required = inner
                .head_length()
                .checked_mul(*size)
                .ok_or_else(|| too_long(data.len()))?;
            decode_params(
                std::iter::repeat(&**inner).take(*size),
                *size,
                required,
                data,
                budget,
            )
            .map(Token::FixedArray)
        }
        ParamType::Tuple(params) => {
            let head_size = params
                .iter()
                .try_fold(0usize, |acc, p| acc.checked_add(p.kind.checked_head_length()?))
                .ok_or_else(|| too_long(data.len()))?;
            decode_params(
                params.iter().map(|p| &p.kind),
                params.len(),
                head_size,
                data,
                budget,
            )
            .map(Token::Tuple)
        }
    }
}

/// Length-prefixed byte payload
fn decode_bytes<'d>(data: &'d [u8], budget: &mut Budget) -> Result<&'d [u8], AbiError> {
    let len = read_usize(data, 0)?;
    let end = len.checked_add(32).ok_or_else(|| too_long(data.len()))?;
    check_length(data, end)?;
    budget.charge(end)?;
    Ok(&data[32..end])
}

/// Read a value word and charge it to the budget
fn read_leaf<'d>(data: &'d [u8], budget: &mut Budget) -> Result<&'d [u8], AbiError> {
    let word = read_word(data, 0)?;
    budget.charge(32)?;
    Ok(word)
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let end = at.checked_add(32).ok_or_else(|| too_long(data.len()))?;
    check_length(data, end)?;
    Ok(&data[at..end])
}

/// Read an offset or length word
fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, at)?);
    if value.bits() > 64 {
        return Err(too_long(data.len()));
    }
    usize::try_from(value.low_u64()).map_err(|_| too_long(data.len()))
}

/// A length or offset no payload could satisfy
fn too_long(available: usize) -> AbiError {
    AbiError::DecodingLength {
        required: usize::MAX,
        available,
    }
}

/// Check that data has at least `required` bytes
fn check_length(data: &[u8], required: usize) -> Result<(), AbiError> {
    if data.len() < required {
        return Err(AbiError::DecodingLength {
            required,
            available: data.len(),
        });
    }
    Ok(())
}

/// Convert a decoded token back into a loose value
fn to_value(param_type: &ParamType, token: Token) -> Value {
    match (param_type, token) {
        (ParamType::Tuple(params), Token::Tuple(tokens)) => {
            let named = !params.is_empty() && params.iter().all(|p| !p.name.is_empty());
            if named {
                Value::Record(
                    params
                        .iter()
                        .zip(tokens)
                        .map(|(p, t)| (p.name.clone(), to_value(&p.kind, t)))
                        .collect(),
                )
            } else {
                Value::Array(
                    params
                        .iter()
                        .zip(tokens)
                        .map(|(p, t)| to_value(&p.kind, t))
                        .collect(),
                )
            }
        }
        (
            ParamType::Array(inner) | ParamType::FixedArray(inner, _),
            Token::Array(tokens) | Token::FixedArray(tokens),
        ) => Value::Array(tokens.into_iter().map(|t| to_value(inner, t)).collect()),
        (_, token) => scalar_value(token),
    }
}

fn scalar_value(token: Token) -> Value {
    match token {
        Token::Address(a) => Value::Address(a),
        Token::Uint(u) => Value::Int(I256::from(u)),
        Token::Int(i) => Value::Int(i),
        Token::Bool(b) => Value::Bool(b),
        Token::Bytes(b) | Token::FixedBytes(b) => Value::Bytes(b),
        Token::String(s) => Value::String(s),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            Value::Array(items.into_iter().map(scalar_value).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_values;
    use crate::function::StateMutability;

    fn word(n: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&n.to_be_bytes());
        w
    }

    fn getter(outputs: Vec<Param>) -> Function {
        Function::new("get", vec![], outputs, StateMutability::View)
    }

    #[test]
    fn test_decode_uint() {
        let tokens = decode(&[ParamType::Uint(256)], &word(1000)).unwrap();
        assert_eq!(tokens, vec![Token::Uint(U256::from(1000))]);
    }

    #[test]
    fn test_decode_output_shapes() {
        let none = getter(vec![]);
        assert_eq!(decode_output(&none, &[]).unwrap(), DecodedOutput::None);

        let one = getter(vec![Param::unnamed(ParamType::Bool)]);
        assert_eq!(
            decode_output(&one, &word(1)).unwrap(),
            DecodedOutput::Single(Value::Bool(true))
        );

        let two = getter(vec![Param::unnamed(ParamType::Uint(8)), Param::unnamed(ParamType::Int(8))]);
        let mut data = word(5).to_vec();
        data.extend([0xffu8; 32]);
        assert_eq!(
            decode_output(&two, &data).unwrap(),
            DecodedOutput::Multiple(vec![Value::from(5u8), Value::from(-1i8)])
        );
    }

    #[test]
    fn test_decode_empty_payload() {
        let one = getter(vec![Param::unnamed(ParamType::Address)]);
        assert_eq!(
            decode_output(&one, &[]).unwrap_err(),
            AbiError::DecodingLength { required: 32, available: 0 }
        );
    }

    #[test]
    fn test_decode_offset_out_of_bounds() {
        // string whose offset points past the payload
        let err = decode(&[ParamType::String], &word(0x400)).unwrap_err();
        assert!(matches!(err, AbiError::DecodingLength { .. }));

        // length word larger than the remaining bytes
        let mut data = word(0x20).to_vec();
        data.extend(word(100));
        let err = decode(&[ParamType::Bytes], &data).unwrap_err();
        assert_eq!(err, AbiError::DecodingLength { required: 132, available: 32 });
    }

    #[test]
    fn test_decode_huge_array_length() {
        let mut data = word(0x20).to_vec();
        data.extend([0xffu8; 32]);
        assert!(matches!(
            decode(&[ParamType::Array(Box::new(ParamType::Uint(256)))], &data),
            Err(AbiError::DecodingLength { .. })
        ));
    }

    #[test]
    fn test_decode_wide_fixed_array_checks_length_first() {
        // string[2^40]: one offset, then nowhere near 2^40 element heads
        let ty = ParamType::FixedArray(Box::new(ParamType::String), 1 << 40);
        let mut data = word(0x20).to_vec();
        data.extend(word(0));
        assert!(matches!(decode(&[ty], &data), Err(AbiError::DecodingLength { .. })));

        let static_ty = ParamType::FixedArray(Box::new(ParamType::Uint(256)), 1 << 40);
        assert!(matches!(
            decode(&[static_ty], &data),
            Err(AbiError::DecodingLength { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_types() {
        let f = getter(vec![Param::unnamed(ParamType::FixedBytes(40))]);
        assert!(matches!(decode_output(&f, &[0u8; 64]), Err(AbiError::InvalidType(_))));

        let empty = getter(vec![Param::unnamed(ParamType::Tuple(vec![]))]);
        assert!(matches!(decode_output(&empty, &[]), Err(AbiError::InvalidType(_))));

        let huge = ParamType::FixedArray(Box::new(ParamType::Uint(256)), usize::MAX);
        assert!(matches!(decode(&[huge], &[0u8; 32]), Err(AbiError::InvalidType(_))));
    }

    /// `uint256[][]` whose `outer` heads all point at one `inner`-element array
    fn aliased_nested_array(outer: u64, inner: u64) -> Vec<u8> {
        let mut data = word(0x20).to_vec();
        data.extend(word(outer));
        for _ in 0..outer {
            data.extend(word(outer * 32));
        }
        data.extend(word(inner));
        for i in 0..inner {
            data.extend(word(i));
        }
        data
    }

    #[test]
    fn test_decode_aliased_tails_are_bounded() {
        let ty = ParamType::Array(Box::new(ParamType::Array(Box::new(ParamType::Uint(256)))));

        // one reference decodes normally
        let tokens = decode(&[ty.clone()], &aliased_nested_array(1, 64)).unwrap();
        assert!(matches!(&tokens[0], Token::Array(outer) if outer.len() == 1));

        // 64 references to 64 words would expand a 4 KiB payload 32-fold
        let data = aliased_nested_array(64, 64);
        assert!(matches!(decode(&[ty], &data), Err(AbiError::DecodingLength { .. })));
    }

    #[test]
    fn test_decode_small_tail_reuse_allowed() {
        // (string,string) with both offsets on the same tail
        let mut data = word(0x40).to_vec();
        data.extend(word(0x40));
        data.extend(word(2));
        let mut tail = [0u8; 32];
        tail[..2].copy_from_slice(b"hi");
        data.extend(tail);
        let tokens = decode(&[ParamType::String, ParamType::String], &data).unwrap();
        assert_eq!(tokens, vec![Token::String("hi".into()), Token::String("hi".into())]);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut data = word(0x20).to_vec();
        data.extend(word(1));
        let mut payload = [0u8; 32];
        payload[0] = 0xff;
        data.extend(payload);
        assert!(matches!(decode(&[ParamType::String], &data), Err(AbiError::InvalidUtf8(_))));
    }

    #[test]
    fn test_decode_named_tuple_as_record() {
        let pool = ParamType::Tuple(vec![
            Param::new("token", ParamType::Address),
            Param::new("fee", ParamType::Uint(24)),
        ]);
        let f = getter(vec![Param::new("pool", pool)]);
        let mut data = word(0xabc).to_vec();
        data.extend(word(3000));

        let out = decode_output(&f, &data).unwrap();
        let pool = out.single().unwrap();
        assert_eq!(pool.field("fee"), Some(&Value::from(3000u32)));
        assert_eq!(
            pool.field("token").and_then(Value::as_address),
            Some(Address::from_hex("0x0000000000000000000000000000000000000abc").unwrap())
        );
    }

    #[test]
    fn test_decode_function_data() {
        let f = Function::new(
            "setName",
            vec![Param::new("name", ParamType::String)],
            vec![],
            StateMutability::NonPayable,
        );
        let mut calldata = f.selector().to_vec();
        calldata.extend(encode_values(&f.input_types(), &[Value::from("fugue")]).unwrap());
        assert_eq!(decode_function_data(&f, &calldata).unwrap(), vec![Value::from("fugue")]);

        calldata[0] ^= 0xff;
        assert!(matches!(
            decode_function_data(&f, &calldata),
            Err(AbiError::SelectorMismatch { .. })
        ));
        assert!(matches!(
            decode_function_data(&f, &[0x01]),
            Err(AbiError::DecodingLength { required: 4, available: 1 })
        ));
    }
}
