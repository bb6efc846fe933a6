//! Closing workflow.
//!
//! - `types` - Closing records, per-type totals and the reconciliation capability
//! - `service` - Guards, closing entries and the period/exercise state transitions

pub mod service;
pub mod types;

#[cfg(test)]
mod closing_props;
#[cfg(test)]
mod tests;

pub use service::ClosingService;
pub use types::{AlwaysReconciled, PeriodClosing, Reconciliation, TypeTotals};
