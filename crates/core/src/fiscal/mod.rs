//! Fiscal year ("exercise") and period management.
//!
//! - `period` - Monthly period keys and inclusive date ranges
//! - `exercise` - Exercise lifecycle and per-period closure status
//! - `calendar` - Registry mapping dates to their owning exercise

pub mod calendar;
pub mod exercise;
pub mod period;

pub use calendar::FiscalCalendar;
pub use exercise::{Exercise, PeriodStatus};
pub use period::{DateRange, PeriodKey};
