//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journal entries and their DRAFT → VALIDATED / CANCELLED lifecycle
//! - The ledger store and its secondary indices
//! - The posting engine (creation, validation, cancellation, reversal)
//! - Balanced batch validation
//! - Running balances for ledger listings
//! - The thread-safe `Ledger` facade with copy-on-write transactions

pub mod admin;
pub mod balance;
pub mod engine;
pub mod entry;
pub mod posting;
pub mod store;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use balance::RunningBalance;
pub use engine::Ledger;
pub use entry::{EntryStatus, JournalEntry, NewEntry, validate_amounts};
pub use store::LedgerStore;
pub use validation::{BatchTotals, validate_batch};
