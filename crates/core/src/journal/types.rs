//! Journal domain types.

use serde::{Deserialize, Serialize};

/// Journal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    /// Supplier invoices.
    Purchases,
    /// Customer invoices.
    Sales,
    /// Bank movements.
    Bank,
    /// Cash movements.
    Cash,
    /// Miscellaneous operations.
    Miscellaneous,
    /// Entries generated by the closing workflow.
    Closing,
}

impl JournalType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchases => "purchases",
            Self::Sales => "sales",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Miscellaneous => "miscellaneous",
            Self::Closing => "closing",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "purchases" => Some(Self::Purchases),
            "sales" => Some(Self::Sales),
            "bank" => Some(Self::Bank),
            "cash" => Some(Self::Cash),
            "miscellaneous" => Some(Self::Miscellaneous),
            "closing" => Some(Self::Closing),
            _ => None,
        }
    }
}

impl std::fmt::Display for JournalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named partition of journal entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Unique code (e.g. "AC", "VT", "BQ").
    pub code: String,
    /// Human readable label.
    pub label: String,
    /// Classification.
    pub journal_type: JournalType,
    /// Inactive journals refuse new entries.
    pub active: bool,
}
