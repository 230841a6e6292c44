//! Type-checked values, one per declared parameter type

use std::fmt;

use fugue_primitives::{Address, U256};

/// A value already checked against its declared [`ParamType`](crate::ParamType)
///
/// Produced by tokenizing caller arguments and by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer in sign-magnitude form
///
/// Zero is never negative, so derived equality is numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256 {
        abs: U256::zero(),
        negative: false,
    };

    /// Create from magnitude and sign
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// True below zero
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// 256-bit two's complement representation
    pub fn to_twos_complement(&self) -> U256 {
        if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        }
    }

    /// Interpret a word as a two's complement signed integer of `bits` width
    ///
    /// Bits above `bits` are ignored; the sign is taken from bit `bits - 1`.
    pub fn from_twos_complement(word: U256, bits: usize) -> Self {
        let bits = bits.clamp(1, 256);
        let value = if bits == 256 {
            word
        } else {
            word & ((U256::one() << bits) - U256::one())
        };
        if !value.bit(bits - 1) {
            return Self::new(value, false);
        }
        // sign-extend, then negate
        let extended = if bits == 256 {
            value
        } else {
            value | (U256::MAX << bits)
        };
        Self::new((!extended).overflowing_add(U256::one()).0, true)
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        I256::from_i128(value)
    }
}

impl From<U256> for I256 {
    fn from(value: U256) -> Self {
        I256::new(value, false)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}
