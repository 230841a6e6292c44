//! Loosely-typed call arguments and decoded results

use std::fmt;

use fugue_primitives::{is_address_literal, Address, H256, U256};

use crate::param_type::ParamType;
use crate::token::I256;
use crate::AbiError;

/// A caller-supplied argument or a decoded return value
///
/// Unlike [`Token`](crate::Token), a `Value` carries no declared width: an
/// integer is just an integer until it is checked against `uint8` or `int256`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Any integer, signed or unsigned
    Int(I256),
    /// Boolean
    Bool(bool),
    /// 20-byte address
    Address(Address),
    /// Raw bytes, for `bytes` and `bytesN`
    Bytes(Vec<u8>),
    /// Text. `0x`-prefixed hex text also stands in for addresses and bytes.
    String(String),
    /// Array, or a tuple given positionally
    Array(Vec<Value>),
    /// Tuple given by component name
    Record(Vec<(String, Value)>),
}

/// The widened class of a [`Value`], used to match arguments against overloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Any integral value
    Integer,
    /// Boolean
    Bool,
    /// Address value or a `0x` string with exactly 40 hex digits
    Address,
    /// Byte value or any other `0x` hex string
    Bytes,
    /// Any other string
    String,
    /// Array, element shapes in order
    List(Vec<Shape>),
    /// Named components
    Record(Vec<(String, Shape)>),
}

impl Value {
    /// Widen to the broadest shape that can represent this value
    pub fn shape(&self) -> Shape {
        match self {
            Value::Int(_) => Shape::Integer,
            Value::Bool(_) => Shape::Bool,
            Value::Address(_) => Shape::Address,
            Value::Bytes(_) => Shape::Bytes,
            Value::String(s) if is_address_literal(s) => Shape::Address,
            Value::String(s) if is_hex_literal(s) => Shape::Bytes,
            Value::String(_) => Shape::String,
            Value::Array(items) => Shape::List(items.iter().map(Value::shape).collect()),
            Value::Record(fields) => Shape::Record(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.shape()))
                    .collect(),
            ),
        }
    }

    /// Create an unsigned integer value
    pub fn uint(value: impl Into<U256>) -> Self {
        Value::Int(I256::from(value.into()))
    }

    /// Build a named-tuple value
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Integer content, if any
    pub fn as_int(&self) -> Option<I256> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Non-negative integer content, if any
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Int(v) if !v.is_negative() => Some(v.abs()),
            _ => None,
        }
    }

    /// Boolean content, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Address content, from an address value or an address literal
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(a) => Some(*a),
            Value::String(s) if is_address_literal(s) => Address::from_hex(s).ok(),
            _ => None,
        }
    }

    /// Byte content, from a bytes value or a hex literal
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(b) => Some(b.clone()),
            Value::String(s) if is_hex_literal(s) => hex::decode(&s[2..]).ok(),
            _ => None,
        }
    }

    /// Text content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array elements, if any
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a record component by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// `0x` followed by hex digits only
pub(crate) fn is_hex_literal(s: &str) -> bool {
    s.strip_prefix("0x")
        .map(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap_or(false)
}

impl Shape {
    /// Whether a value of this shape can be encoded as `ty`
    ///
    /// Width and signedness are not checked here; the encoder range-checks later.
    pub fn fits(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (Shape::Integer, ParamType::Uint(_) | ParamType::Int(_)) => true,
            (Shape::Bool, ParamType::Bool) => true,
            (Shape::Address, ParamType::Address) => true,
            (Shape::Address | Shape::Bytes, ParamType::Bytes | ParamType::FixedBytes(_)) => true,
            (Shape::String, ParamType::String) => true,
            (Shape::List(items), ParamType::Array(inner)) => items.iter().all(|s| s.fits(inner)),
            (Shape::List(items), ParamType::FixedArray(inner, len)) => {
                items.len() == *len && items.iter().all(|s| s.fits(inner))
            }
            (Shape::List(items), ParamType::Tuple(params)) => {
                items.len() == params.len()
                    && items.iter().zip(params).all(|(s, p)| s.fits(&p.kind))
            }
            (Shape::Record(fields), ParamType::Tuple(params)) => {
                fields.len() == params.len()
                    && params.iter().all(|p| {
                        !p.name.is_empty()
                            && fields
                                .iter()
                                .any(|(name, s)| *name == p.name && s.fits(&p.kind))
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Integer => f.write_str("integer"),
            Shape::Bool => f.write_str("bool"),
            Shape::Address => f.write_str("address"),
            Shape::Bytes => f.write_str("bytes"),
            Shape::String => f.write_str("string"),
            Shape::List(items) => {
                f.write_str("[")?;
                for (i, s) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", s)?;
                }
                f.write_str("]")
            }
            Shape::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, s)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", name, s)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Render argument shapes as a comma-separated list
pub(crate) fn describe_shapes(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.shape().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ==================== Conversions ====================

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(I256::from_i128(v as i128))
            }
        }
    )*};
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(I256::from(U256::from(v)))
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64, i128, isize);
impl_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Value::Int(I256::from(v))
    }
}

impl From<I256> for Value {
    fn from(v: I256) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Address> for Value {
    fn from(v: Address) -> Self {
        Value::Address(v)
    }
}

impl From<H256> for Value {
    fn from(v: H256) -> Self {
        Value::Bytes(v.as_bytes().to_vec())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = AbiError;

    /// Objects become records; numbers must be integers
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(Value::from(u))
                } else if let Some(i) = n.as_i64() {
                    Ok(Value::from(i))
                } else {
                    Err(AbiError::InvalidValue(format!("non-integral number {}", n)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Record),
            serde_json::Value::Null => Err(AbiError::InvalidValue("null".to_string())),
        }
    }
}
