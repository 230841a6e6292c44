//! # fugue-primitives
//!
//! Primitive types shared by the fugue contract call engine.
//!
//! - [`Address`]: 20-byte account/contract address
//! - [`H256`]: 32-byte hash, used for transaction handles and storage keys
//! - [`keccak256`]: the hash behind function selectors
//! - [`U256`]: re-exported from `primitive-types`

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{is_address_literal, Address, AddressError};
pub use hash::{keccak256, HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
