//! Chart of accounts.
//!
//! Accounts live in a flat table keyed by code; the parent/child tree is
//! expressed through parent codes and cycle-checked on every change.

pub mod account;
pub mod registry;

pub use account::{Account, AccountType, NewAccount, NormalBalance};
pub use registry::ChartOfAccounts;
