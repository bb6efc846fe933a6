//! Financial report generation.
//!
//! This module provides pure read-side projections over a ledger snapshot:
//! - General Ledger
//! - Trial Balance
//! - Balance Sheet
//! - Income Statement

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
