//! # fugue-abi
//!
//! Contract interface model and call-data codec.
//!
//! ## Features
//!
//! - **Abi**: load a contract interface from JSON or human-readable declarations
//! - **resolve**: pick one function by name, mutability path and argument shape
//! - **encode_call**: selector plus head/tail encoded arguments
//! - **decode_output**: return data back into [`Value`]s
//!
//! ## Example
//!
//! ```rust
//! use fugue_abi::{decode_output, encode_call, resolve, Abi, DecodedOutput, MutabilityClass, Value};
//!
//! let abi = Abi::parse_human(&[
//!     "function foo() view returns (bool)",
//!     "function foo(string) view returns (uint8)",
//!     "function foo(uint256) view returns (address)",
//! ])?;
//!
//! let args = [Value::from(123u32)];
//! let foo = resolve(&abi, "foo", Some(&args), MutabilityClass::Read)?;
//! assert_eq!(foo.signature(), "foo(uint256)");
//!
//! let data = encode_call(foo, &args, None)?;
//! assert_eq!(data.len(), 4 + 32);
//!
//! let returned = [0u8; 32];
//! let out = decode_output(foo, &returned)?;
//! assert!(matches!(out, DecodedOutput::Single(Value::Address(_))));
//! # Ok::<(), fugue_abi::AbiError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod encode;
mod error;
mod function;
mod human;
mod interface;
mod param_type;
mod resolve;
mod token;
mod value;

pub use decode::{decode, decode_function_data, decode_output, decode_values, DecodedOutput};
pub use encode::{encode, encode_call, encode_values, function_selector, tokenize};
pub use error::AbiError;
pub use function::{ErrorDef, Event, EventParam, Function, MutabilityClass, StateMutability};
pub use human::parse_entry;
pub use interface::{Abi, AbiEntry};
pub use param_type::{Param, ParamType};
pub use resolve::resolve;
pub use token::{Token, I256};
pub use value::{Shape, Value};
