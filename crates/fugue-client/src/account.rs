//! Sender identity for state-mutating calls

use fugue_primitives::Address;

/// Supplies the `from` address of a transaction
///
/// Keys stay with the implementor; requests go out unsigned and the node
/// signs them for this account.
pub trait Account: Send + Sync {
    /// Sender address
    fn address(&self) -> Address;
}

impl Account for Address {
    fn address(&self) -> Address {
        *self
    }
}
