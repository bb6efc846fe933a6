//! Core bookkeeping engine for Grand Livre.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `chart` - Chart of accounts with hierarchy and running totals
//! - `journal` - Journal registry
//! - `fiscal` - Exercises, period keys and their open/closed lifecycle
//! - `ledger` - Ledger store, posting engine and the thread-safe `Ledger` facade
//! - `reports` - General ledger, trial balance, balance sheet, income statement
//! - `closing` - Period and exercise closing workflow
//! - `error` - Error taxonomy

pub mod chart;
pub mod closing;
pub mod error;
pub mod fiscal;
pub mod journal;
pub mod ledger;
pub mod reports;

pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::{Ledger, LedgerStore};
