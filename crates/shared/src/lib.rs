//! Shared types and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed 128-bit IDs for accounts and transfers
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, BATCH_MAX_CEILING, ConfigLoadError, LedgerConfig, LogConfig};
pub use types::{AccountId, TransferId, is_valid_id};
