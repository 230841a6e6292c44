//! Contract interface (ABI) loading and lookup

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::function::{ErrorDef, Event, EventParam, Function, StateMutability};
use crate::param_type::{apply_array_suffix, validate_params, Param, ParamType};
use crate::AbiError;

/// One entry of a contract interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiEntry {
    /// Callable function
    Function(Function),
    /// Event
    Event(Event),
    /// Custom error
    Error(ErrorDef),
    /// Constructor
    Constructor {
        /// Constructor arguments
        inputs: Vec<Param>,
        /// Constructor mutability
        state_mutability: StateMutability,
    },
    /// Fallback function
    Fallback {
        /// Whether it accepts value
        state_mutability: StateMutability,
    },
    /// Receive function
    Receive,
}

/// Validated, immutable contract interface
///
/// Entries keep their declaration order. Function signatures are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    entries: Vec<AbiEntry>,
}

impl Abi {
    /// Build an interface from entries, rejecting malformed ones
    ///
    /// Every parameter type is validated here, so the codec never sees a type
    /// it cannot lay out.
    pub fn new(entries: Vec<AbiEntry>) -> Result<Self, AbiError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            validate_entry(entry)?;
            match entry {
                AbiEntry::Function(f) => {
                    if f.name.is_empty() {
                        return Err(AbiError::InvalidAbi("function with empty name".to_string()));
                    }
                    let signature = f.signature();
                    if !seen.insert(signature.clone()) {
                        return Err(AbiError::InvalidAbi(format!(
                            "duplicate function {}",
                            signature
                        )));
                    }
                }
                AbiEntry::Event(e) if e.name.is_empty() => {
                    return Err(AbiError::InvalidAbi("event with empty name".to_string()));
                }
                AbiEntry::Error(e) if e.name.is_empty() => {
                    return Err(AbiError::InvalidAbi("error with empty name".to_string()));
                }
                _ => {}
            }
        }

        debug!(entries = entries.len(), "loaded ABI");
        Ok(Self { entries })
    }

    /// Load from JSON: either an entry array or a compiler artifact with an `abi` field
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Self::from_slice(json.as_bytes())
    }

    /// Load from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AbiError> {
        let raw: RawAbi = serde_json::from_slice(bytes)?;
        let raw_entries = match raw {
            RawAbi::Entries(entries) => entries,
            RawAbi::Artifact { abi } => abi,
        };
        let entries = raw_entries
            .into_iter()
            .map(RawEntry::into_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    /// All functions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Every overload named `name`
    ///
    /// Fails with [`AbiError::NotFound`] when the ABI has no function of that name.
    pub fn functions_named(&self, name: &str) -> Result<Vec<&Function>, AbiError> {
        let found: Vec<&Function> = self.functions().filter(|f| f.name == name).collect();
        if found.is_empty() {
            return Err(AbiError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(found)
    }

    /// All events
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Event(ev) => Some(ev),
            _ => None,
        })
    }

    /// All custom errors
    pub fn errors(&self) -> impl Iterator<Item = &ErrorDef> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Error(err) => Some(err),
            _ => None,
        })
    }
}

// ==================== JSON representation ====================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAbi {
    Entries(Vec<RawEntry>),
    Artifact { abi: Vec<RawEntry> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    // pre-0.5 compilers emit these instead of stateMutability
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Option<Vec<RawParam>>,
    #[serde(default)]
    indexed: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

impl RawEntry {
    fn mutability(&self) -> StateMutability {
        match (self.state_mutability, self.payable, self.constant) {
            (Some(m), _, _) => m,
            (None, Some(true), _) => StateMutability::Payable,
            (None, _, Some(true)) => StateMutability::View,
            _ => StateMutability::NonPayable,
        }
    }

    fn into_entry(self) -> Result<AbiEntry, AbiError> {
        let state_mutability = self.mutability();
        match self.kind.as_str() {
            "function" => Ok(AbiEntry::Function(Function {
                name: self.require_name()?,
                inputs: RawParam::convert_all(self.inputs)?,
                outputs: RawParam::convert_all(self.outputs)?,
                state_mutability,
            })),
            "event" => {
                let name = self.require_name()?;
                let inputs = self
                    .inputs
                    .into_iter()
                    .map(|p| {
                        let indexed = p.indexed;
                        p.into_param().map(|param| EventParam { param, indexed })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AbiEntry::Event(Event {
                    name,
                    inputs,
                    anonymous: self.anonymous,
                }))
            }
            "error" => Ok(AbiEntry::Error(ErrorDef {
                name: self.require_name()?,
                inputs: RawParam::convert_all(self.inputs)?,
            })),
            "constructor" => Ok(AbiEntry::Constructor {
                inputs: RawParam::convert_all(self.inputs)?,
                state_mutability,
            }),
            "fallback" => Ok(AbiEntry::Fallback { state_mutability }),
            "receive" => Ok(AbiEntry::Receive),
            other => Err(AbiError::InvalidAbi(format!("unknown entry type `{}`", other))),
        }
    }

    fn require_name(&self) -> Result<String, AbiError> {
        match &self.name {
            Some(name) if !name.is_empty() => Ok(name.clone()),
            _ => Err(AbiError::InvalidAbi(format!("{} without a name", self.kind))),
        }
    }
}

impl RawParam {
    fn convert_all(params: Vec<RawParam>) -> Result<Vec<Param>, AbiError> {
        params.into_iter().map(RawParam::into_param).collect()
    }

    fn into_param(self) -> Result<Param, AbiError> {
        let kind = match self.kind.strip_prefix("tuple") {
            Some(suffix) => {
                let components = self.components.ok_or_else(|| {
                    AbiError::InvalidAbi(format!("tuple `{}` without components", self.name))
                })?;
                apply_array_suffix(ParamType::Tuple(Self::convert_all(components)?), suffix)?
            }
            None => ParamType::parse(&self.kind)?,
        };
        Ok(Param::new(self.name, kind))
    }
}

/// Parameter types of one entry must all be well formed
fn validate_entry(entry: &AbiEntry) -> Result<(), AbiError> {
    let result = match entry {
        AbiEntry::Function(f) => validate_params(&f.inputs).and_then(|_| validate_params(&f.outputs)),
        AbiEntry::Event(e) => e.inputs.iter().try_for_each(|p| p.param.kind.validate()),
        AbiEntry::Error(e) => validate_params(&e.inputs),
        AbiEntry::Constructor { inputs, .. } => validate_params(inputs),
        AbiEntry::Fallback { .. } | AbiEntry::Receive => Ok(()),
    };
    result.map_err(|e| AbiError::InvalidAbi(format!("{}: {}", entry_label(entry), e)))
}

fn entry_label(entry: &AbiEntry) -> String {
    match entry {
        AbiEntry::Function(f) => format!("function {}", f.name),
        AbiEntry::Event(e) => format!("event {}", e.name),
        AbiEntry::Error(e) => format!("error {}", e.name),
        AbiEntry::Constructor { .. } => "constructor".to_string(),
        AbiEntry::Fallback { .. } => "fallback".to_string(),
        AbiEntry::Receive => "receive".to_string(),
    }
}
