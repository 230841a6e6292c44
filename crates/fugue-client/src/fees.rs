//! Fee-model validation for state-mutating calls

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AccessListItem;
use crate::ClientError;

const GAS_PRICE: &str = "gasPrice";
const MAX_FEE: &str = "maxFeePerGas";
const MAX_PRIORITY_FEE: &str = "maxPriorityFeePerGas";
const ACCESS_LIST: &str = "accessList";

/// Transaction envelope type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Plain gas price
    Legacy,
    /// Gas price plus access list
    Eip2930,
    /// Max fee and max priority fee
    Eip1559,
}

impl TxKind {
    /// EIP-2718 type byte
    pub fn type_byte(self) -> u8 {
        match self {
            TxKind::Legacy => 0,
            TxKind::Eip2930 => 1,
            TxKind::Eip1559 => 2,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TxKind::Legacy => "legacy",
            TxKind::Eip2930 => "eip2930",
            TxKind::Eip1559 => "eip1559",
        })
    }
}

/// Caller-supplied pricing for a transaction
///
/// Exactly one fee model may be described. Nothing at all is also accepted
/// and leaves pricing to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeFields {
    /// Explicit envelope type; must agree with the fields
    pub tx_type: Option<TxKind>,
    /// Gas price (legacy, EIP-2930)
    pub gas_price: Option<u128>,
    /// Max fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<u128>,
    /// Access list (EIP-2930, EIP-1559)
    pub access_list: Option<Vec<AccessListItem>>,
}

impl FeeFields {
    /// Legacy pricing
    pub fn legacy(gas_price: u128) -> Self {
        Self::default().gas_price(gas_price)
    }

    /// EIP-2930 pricing
    pub fn eip2930(gas_price: u128, access_list: Vec<AccessListItem>) -> Self {
        Self::default().gas_price(gas_price).access_list(access_list)
    }

    /// EIP-1559 pricing
    pub fn eip1559(max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        Self::default()
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(max_priority_fee_per_gas)
    }

    /// Set the gas price
    pub fn gas_price(mut self, price: u128) -> Self {
        self.gas_price = Some(price);
        self
    }

    /// Set max fee per gas
    pub fn max_fee_per_gas(mut self, fee: u128) -> Self {
        self.max_fee_per_gas = Some(fee);
        self
    }

    /// Set max priority fee per gas
    pub fn max_priority_fee_per_gas(mut self, fee: u128) -> Self {
        self.max_priority_fee_per_gas = Some(fee);
        self
    }

    /// Set the access list
    pub fn access_list(mut self, list: Vec<AccessListItem>) -> Self {
        self.access_list = Some(list);
        self
    }

    /// Pin the envelope type
    pub fn tx_type(mut self, kind: TxKind) -> Self {
        self.tx_type = Some(kind);
        self
    }

    /// Check that the fields describe one fee model and return its type
    ///
    /// Returns `None` when no pricing was supplied at all.
    pub fn validate(&self) -> Result<Option<TxKind>, ClientError> {
        let has_max_fee = self.max_fee_per_gas.is_some();
        let has_priority = self.max_priority_fee_per_gas.is_some();

        if self.gas_price.is_some() && (has_max_fee || has_priority) {
            let mut fields = vec![GAS_PRICE.to_string()];
            if has_max_fee {
                fields.push(MAX_FEE.to_string());
            }
            if has_priority {
                fields.push(MAX_PRIORITY_FEE.to_string());
            }
            return Err(ClientError::ConflictingFeeFields { fields });
        }

        if let Some(kind) = self.tx_type {
            let foreign: Vec<&str> = match kind {
                TxKind::Legacy => [
                    (ACCESS_LIST, self.access_list.is_some()),
                    (MAX_FEE, has_max_fee),
                    (MAX_PRIORITY_FEE, has_priority),
                ]
                .iter()
                .filter(|(_, present)| *present)
                .map(|(name, _)| *name)
                .collect(),
                TxKind::Eip2930 => [(MAX_FEE, has_max_fee), (MAX_PRIORITY_FEE, has_priority)]
                    .iter()
                    .filter(|(_, present)| *present)
                    .map(|(name, _)| *name)
                    .collect(),
                TxKind::Eip1559 => match self.gas_price {
                    Some(_) => vec![GAS_PRICE],
                    None => Vec::new(),
                },
            };
            if !foreign.is_empty() {
                let mut fields = vec![format!("type={}", kind)];
                fields.extend(foreign.into_iter().map(String::from));
                return Err(ClientError::ConflictingFeeFields { fields });
            }
        }

        match (has_max_fee, has_priority) {
            (true, false) => {
                return Err(ClientError::IncompleteFeeFields {
                    supplied: MAX_FEE.to_string(),
                    missing: MAX_PRIORITY_FEE.to_string(),
                })
            }
            (false, true) => {
                return Err(ClientError::IncompleteFeeFields {
                    supplied: MAX_PRIORITY_FEE.to_string(),
                    missing: MAX_FEE.to_string(),
                })
            }
            _ => {}
        }

        if self.tx_type.is_some() {
            return Ok(self.tx_type);
        }
        let inferred = if has_max_fee {
            Some(TxKind::Eip1559)
        } else if self.access_list.is_some() {
            Some(TxKind::Eip2930)
        } else if self.gas_price.is_some() {
            Some(TxKind::Legacy)
        } else {
            None
        };
        Ok(inferred)
    }
}
