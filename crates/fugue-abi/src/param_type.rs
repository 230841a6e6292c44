//! Parameter types

use std::fmt;

use crate::AbiError;

/// Parameter types of the call-data encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple, components optionally named
    Tuple(Vec<Param>),
}

/// A named parameter: function input/output or tuple component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    /// Parameter name, empty when unnamed
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
}

impl Param {
    /// Create a named parameter
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create an unnamed parameter
    pub fn unnamed(kind: ParamType) -> Self {
        Self::new(String::new(), kind)
    }
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(params) => params.iter().any(|p| p.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing block
    ///
    /// Dynamic types take one offset word; static composites are laid out inline.
    /// Saturates at `usize::MAX` for types that [`validate`](Self::validate) rejects.
    pub fn head_length(&self) -> usize {
        self.checked_head_length().unwrap_or(usize::MAX)
    }

    /// [`head_length`](Self::head_length), or `None` when it overflows
    pub fn checked_head_length(&self) -> Option<usize> {
        match self {
            ParamType::FixedArray(inner, size) if !self.is_dynamic() => {
                inner.checked_head_length()?.checked_mul(*size)
            }
            ParamType::Tuple(params) if !self.is_dynamic() => params
                .iter()
                .try_fold(0usize, |acc, p| acc.checked_add(p.kind.checked_head_length()?)),
            _ => Some(32),
        }
    }

    /// Check widths, sizes and nesting against the encoding's rules
    ///
    /// Applies the same limits as [`parse`](Self::parse), so hand-built types are
    /// held to what a type string could express. Fixed arrays must also have an
    /// element block whose width fits in `usize`.
    pub fn validate(&self) -> Result<(), AbiError> {
        let invalid = |why: &str| Err(AbiError::InvalidType(format!("{}: {}", self, why)));
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                if *bits == 0 || *bits > 256 || bits % 8 != 0 {
                    return invalid("width must be a multiple of 8 in 8-256");
                }
                Ok(())
            }
            ParamType::FixedBytes(size) => {
                if !(1..=32).contains(size) {
                    return invalid("size must be 1-32");
                }
                Ok(())
            }
            ParamType::Array(inner) => inner.validate(),
            ParamType::FixedArray(inner, size) => {
                inner.validate()?;
                if *size == 0 {
                    return invalid("fixed array needs at least one element");
                }
                // element heads of the inner block
                if inner.head_length().checked_mul(*size).is_none() {
                    return invalid("array too large");
                }
                Ok(())
            }
            ParamType::Tuple(params) => {
                if params.is_empty() {
                    return invalid("tuple needs at least one component");
                }
                for p in params {
                    p.kind.validate()?;
                }
                if self.checked_head_length().is_none() {
                    return invalid("tuple too large");
                }
                Ok(())
            }
            ParamType::Address | ParamType::Bool | ParamType::Bytes | ParamType::String => Ok(()),
        }
    }

    /// Parse a type string such as `uint256`, `bytes32[]` or `(address,uint8)[2]`
    pub fn parse(s: &str) -> Result<ParamType, AbiError> {
        let s = s.trim();
        let (base, suffix) = split_array_suffix(s)?;

        let base = if let Some(inner) = base.strip_prefix('(') {
            let inner = inner
                .strip_suffix(')')
                .ok_or_else(|| AbiError::InvalidType(s.to_string()))?;
            let params = split_top_level(inner)?
                .into_iter()
                .map(|c| ParamType::parse(c).map(Param::unnamed))
                .collect::<Result<Vec<_>, _>>()?;
            ParamType::Tuple(params)
        } else {
            parse_elementary(base)?
        };

        let parsed = apply_array_suffix(base, suffix)?;
        parsed.validate()?;
        Ok(parsed)
    }
}

/// Validate every parameter in a list
pub(crate) fn validate_params(params: &[Param]) -> Result<(), AbiError> {
    params.iter().try_for_each(|p| p.kind.validate())
}

impl fmt::Display for ParamType {
    /// Canonical name, as used in signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::String => f.write_str("string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, size) => write!(f, "{}[{}]", inner, size),
            ParamType::Tuple(params) => {
                f.write_str("(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", p.kind)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parse a non-composite type name
fn parse_elementary(s: &str) -> Result<ParamType, AbiError> {
    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        "tuple" => {
            return Err(AbiError::InvalidType(
                "tuple without components".to_string(),
            ))
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return parse_bits(s, rest).map(ParamType::Uint);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return parse_bits(s, rest).map(ParamType::Int);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        let size = parse_number(s, rest)?;
        if !(1..=32).contains(&size) {
            return Err(AbiError::InvalidType(format!("{}: size must be 1-32", s)));
        }
        return Ok(ParamType::FixedBytes(size));
    }

    Err(AbiError::InvalidType(s.to_string()))
}

fn parse_bits(ty: &str, digits: &str) -> Result<usize, AbiError> {
    let bits = parse_number(ty, digits)?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::InvalidType(format!(
            "{}: width must be a multiple of 8 in 8-256",
            ty
        )));
    }
    Ok(bits)
}

fn parse_number(ty: &str, digits: &str) -> Result<usize, AbiError> {
    // leading zeros would break the canonical signature
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AbiError::InvalidType(ty.to_string()));
    }
    digits
        .parse()
        .map_err(|_| AbiError::InvalidType(ty.to_string()))
}

/// Split `T[2][]` into (`T`, `[2][]`)
pub(crate) fn split_array_suffix(s: &str) -> Result<(&str, &str), AbiError> {
    let mut end = s.len();
    while s[..end].ends_with(']') {
        let open = s[..end]
            .rfind('[')
            .ok_or_else(|| AbiError::InvalidType(s.to_string()))?;
        end = open;
    }
    Ok((&s[..end], &s[end..]))
}

/// Wrap `base` in the array dimensions of `suffix`, innermost first
pub(crate) fn apply_array_suffix(mut base: ParamType, suffix: &str) -> Result<ParamType, AbiError> {
    let mut rest = suffix.trim();
    while !rest.is_empty() {
        let close = match (rest.strip_prefix('['), rest.find(']')) {
            (Some(_), Some(close)) => close,
            _ => return Err(AbiError::InvalidType(format!("bad array suffix `{}`", suffix))),
        };
        let dim = rest[1..close].trim();
        base = if dim.is_empty() {
            ParamType::Array(Box::new(base))
        } else {
            let size = parse_number(dim, dim)?;
            ParamType::FixedArray(Box::new(base), size)
        };
        rest = rest[close + 1..].trim_start();
    }
    Ok(base)
}

/// Split on commas that are not nested inside parentheses
pub(crate) fn split_top_level(s: &str) -> Result<Vec<&str>, AbiError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(AbiError::InvalidType(format!("unbalanced `{}`", s)));
                }
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::InvalidType(format!("unbalanced `{}`", s)));
    }
    parts.push(s[start..].trim());

    if parts.iter().any(|p| p.is_empty()) {
        return Err(AbiError::InvalidType(format!("empty component in `{}`", s)));
    }
    Ok(parts)
}
