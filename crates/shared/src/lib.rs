//! Shared types and configuration for Grand Livre.
//!
//! This crate provides common types used across all other crates:
//! - Non-negative amounts with decimal precision
//! - Typed IDs for type-safe references
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, LedgerConfig, LoggingConfig};
pub use types::{ActorId, Amount, AmountError, EntryId};
