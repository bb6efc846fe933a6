//! Journal registry.
//!
//! Journals partition entries by transaction origin (purchases, sales, bank,
//! cash, miscellaneous) plus the closing journal used by the engine itself.

pub mod registry;
pub mod types;

pub use registry::JournalRegistry;
pub use types::{Journal, JournalType};
