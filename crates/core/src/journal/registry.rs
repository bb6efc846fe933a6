//! Journal registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Journal, JournalType};
use crate::error::LedgerError;

/// All journals, keyed by code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalRegistry {
    journals: BTreeMap<String, Journal>,
}

impl JournalRegistry {
    /// Creates an active journal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJournalCode` for an empty or whitespace-bearing code and
    /// `DuplicateJournal` if the code exists.
    pub fn create_journal(
        &mut self,
        code: &str,
        label: &str,
        journal_type: JournalType,
    ) -> Result<&Journal, LedgerError> {
        if code.is_empty() || code.chars().any(char::is_whitespace) {
            return Err(LedgerError::InvalidJournalCode(code.to_string()));
        }
        if self.journals.contains_key(code) {
            return Err(LedgerError::DuplicateJournal(code.to_string()));
        }
        let journal = Journal {
            code: code.to_string(),
            label: label.to_string(),
            journal_type,
            active: true,
        };
        Ok(self.journals.entry(code.to_string()).or_insert(journal))
    }

    /// Looks up a journal by code.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` if the code is unknown.
    pub fn resolve(&self, code: &str) -> Result<&Journal, LedgerError> {
        self.journals
            .get(code)
            .ok_or_else(|| LedgerError::JournalNotFound(code.to_string()))
    }

    /// Sets the active flag. Callers check usage before deactivating.
    pub(crate) fn set_active(&mut self, code: &str, active: bool) -> Result<(), LedgerError> {
        self.journals
            .get_mut(code)
            .ok_or_else(|| LedgerError::JournalNotFound(code.to_string()))?
            .active = active;
        Ok(())
    }
}
