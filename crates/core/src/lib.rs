//! Ledger correctness core for Tally.
//!
//! This crate decides whether accounts and transfers are admissible and how
//! they change balances. It has ZERO storage engine or network dependencies;
//! persistence goes through the [`ledger::LedgerStore`] trait.
//!
//! # Modules
//!
//! - `id` - Time-sortable 128-bit identifiers and the ledger clock
//! - `ledger` - Validation, reconciliation, resolution and mutation of
//!   accounts and transfers

pub mod id;
pub mod ledger;
