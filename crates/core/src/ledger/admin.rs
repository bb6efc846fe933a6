//! Setup and administration of accounts, journals and exercises.

use chrono::NaiveDate;
use tracing::info;

use super::entry::EntryStatus;
use super::store::LedgerStore;
use crate::chart::{Account, AccountType, NewAccount};
use crate::error::LedgerError;
use crate::fiscal::Exercise;
use crate::journal::{Journal, JournalType};

impl LedgerStore {
    /// Creates an account in the chart.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountCode`, `DuplicateAccount`, `UnknownParent` or `CyclicHierarchy`.
    pub fn create_account(&mut self, input: NewAccount) -> Result<&Account, LedgerError> {
        let account = self.chart.create_account(input)?;
        info!(
            code = %account.code,
            account_type = %account.account_type,
            parent = ?account.parent,
            "Account created"
        );
        Ok(account)
    }

    /// Renames an account. The code never changes.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`.
    pub fn rename_account(&mut self, code: &str, label: &str) -> Result<(), LedgerError> {
        self.chart.rename(code, label)?;
        info!(code, label, "Account renamed");
        Ok(())
    }

    /// Soft-deletes an account: it keeps its history but refuses new entries.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`.
    pub fn deactivate_account(&mut self, code: &str) -> Result<(), LedgerError> {
        self.chart.set_active(code, false)?;
        info!(code, "Account deactivated");
        Ok(())
    }

    /// Re-enables a deactivated account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`.
    pub fn reactivate_account(&mut self, code: &str) -> Result<(), LedgerError> {
        self.chart.set_active(code, true)?;
        info!(code, "Account reactivated");
        Ok(())
    }

    /// Moves an account in the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `UnknownParent` or `CyclicHierarchy`.
    pub fn set_account_parent(
        &mut self,
        code: &str,
        parent: Option<&str>,
    ) -> Result<(), LedgerError> {
        self.chart.set_parent(code, parent)?;
        info!(code, parent, "Account moved");
        Ok(())
    }

    /// Reclassifies an account that has no validated postings.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountTypeLocked`.
    pub fn change_account_type(
        &mut self,
        code: &str,
        account_type: AccountType,
    ) -> Result<(), LedgerError> {
        self.chart.change_type(code, account_type)?;
        info!(code, account_type = %account_type, "Account type changed");
        Ok(())
    }

    /// Registers a journal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJournalCode` or `DuplicateJournal`.
    pub fn create_journal(
        &mut self,
        code: &str,
        label: &str,
        journal_type: JournalType,
    ) -> Result<&Journal, LedgerError> {
        let journal = self.journals.create_journal(code, label, journal_type)?;
        info!(code, journal_type = %journal_type, "Journal created");
        Ok(journal)
    }

    /// Deactivates a journal that has no live entries in an open exercise.
    ///
    /// Cancelled entries do not count; entries in closed exercises do not count.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` or `JournalInUse`.
    pub fn deactivate_journal(&mut self, code: &str) -> Result<(), LedgerError> {
        self.journals.resolve(code)?;

        let entries = self
            .entries()
            .filter(|e| e.journal_code == code && e.status != EntryStatus::Cancelled)
            .filter(|e| {
                self.calendar
                    .exercise_for(e.date)
                    .is_ok_and(|exercise| !exercise.closed)
            })
            .count();
        if entries > 0 {
            return Err(LedgerError::JournalInUse {
                code: code.to_string(),
                entries,
            });
        }

        self.journals.set_active(code, false)?;
        info!(code, "Journal deactivated");
        Ok(())
    }

    /// Re-enables a deactivated journal.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound`.
    pub fn reactivate_journal(&mut self, code: &str) -> Result<(), LedgerError> {
        self.journals.set_active(code, true)?;
        info!(code, "Journal reactivated");
        Ok(())
    }

    /// Opens a new exercise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExerciseYear`, `InvalidRange`, `DuplicateExercise` or
    /// `OverlappingExercise`.
    pub fn create_exercise(
        &mut self,
        year: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&Exercise, LedgerError> {
        let exercise = self.calendar.create_exercise(year, start, end)?;
        info!(
            year,
            %start,
            %end,
            periods = exercise.periods.len(),
            "Exercise created"
        );
        Ok(exercise)
    }
}
