//! Function, event and error descriptors

use std::fmt;

use fugue_primitives::keccak256;
use serde::{Deserialize, Serialize};

use crate::param_type::{Param, ParamType};

/// State mutability of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads no state
    Pure,
    /// Reads but does not modify state
    View,
    /// Modifies state, rejects value transfers
    NonPayable,
    /// Modifies state, accepts value transfers
    Payable,
}

impl StateMutability {
    /// Parse a mutability keyword
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }

    /// Which dispatch path this mutability belongs to
    pub fn class(self) -> MutabilityClass {
        match self {
            StateMutability::Pure | StateMutability::View => MutabilityClass::Read,
            StateMutability::NonPayable | StateMutability::Payable => MutabilityClass::Write,
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        })
    }
}

/// The two dispatch paths: `pure`/`view` queries and `nonpayable`/`payable` transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutabilityClass {
    /// Query path
    Read,
    /// Transaction path
    Write,
}

impl MutabilityClass {
    /// Whether a function with `mutability` is callable on this path
    pub fn admits(self, mutability: StateMutability) -> bool {
        mutability.class() == self
    }
}

impl fmt::Display for MutabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutabilityClass::Read => "read-only",
            MutabilityClass::Write => "state-mutating",
        })
    }
}

/// Contract function descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Create a new function descriptor
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        state_mutability: StateMutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// First four bytes of keccak256 of the signature
    pub fn selector(&self) -> [u8; 4] {
        keccak256(self.signature().as_bytes()).prefix4()
    }

    /// True for `pure` and `view` functions
    pub fn is_read_only(&self) -> bool {
        self.state_mutability.class() == MutabilityClass::Read
    }

    /// Input types in declaration order
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Output types in declaration order
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }
}

/// Event parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    /// Parameter
    pub param: Param,
    /// Stored as a topic rather than in the data section
    pub indexed: bool,
}

/// Event descriptor. Carried for completeness; never resolved as a call target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Parameters
    pub inputs: Vec<EventParam>,
    /// Anonymous events have no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        let params: Vec<Param> = self.inputs.iter().map(|p| p.param.clone()).collect();
        signature(&self.name, &params)
    }
}

/// Custom error descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDef {
    /// Error name
    pub name: String,
    /// Parameters
    pub inputs: Vec<Param>,
}

impl ErrorDef {
    /// Canonical signature
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }
}

fn signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}
