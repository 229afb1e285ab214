//! Double-entry ledger logic.
//!
//! This module implements the ledger correctness core:
//! - Account and transfer records with their flag sets
//! - Field validation and existence reconciliation
//! - Transfer resolution (two-phase, balancing, overflow, expiry)
//! - Mutation planning and the storage trait
//! - The batch service with linked-chain atomicity

pub mod error;
pub mod existence;
pub mod mutator;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use error::{CreateAccountError, CreateTransferError, ErrorCategory, LedgerError};
pub use existence::{reconcile_account, reconcile_transfer};
pub use mutator::LedgerMutator;
pub use resolver::{ExpiredPending, Resolution, ResolvedTransfer, TransferResolver, balancing_capacity};
pub use service::{Applied, IndexedResult, LedgerService};
pub use store::{AccountDelta, BalanceChange, InMemoryStore, LedgerStore, Mutation, Scratch, StoreError};
pub use types::{
    Account, AccountBalance, AccountFlags, NS_PER_SECOND, PendingStatus, Transfer, TransferFlags,
    TransferKind,
};
pub use validation::{validate_account, validate_transfer};
