//! The ledger facade.
//!
//! All mutations go through a single write path: the writer lock is taken,
//! the current store is cloned, the operation runs on the clone and the clone
//! is published only if the operation succeeds. Readers work on immutable
//! snapshots and only contend with writers for the pointer swap.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDate;
use grandlivre_shared::{ActorId, EntryId, LedgerConfig};
use rust_decimal::Decimal;
use tracing::info;

use super::entry::{JournalEntry, NewEntry};
use super::store::LedgerStore;
use crate::chart::{Account, AccountType, NewAccount};
use crate::closing::{ClosingService, PeriodClosing, Reconciliation};
use crate::error::{LedgerError, LedgerResult};
use crate::fiscal::{DateRange, Exercise, PeriodKey};
use crate::journal::{Journal, JournalType};
use crate::reports::{
    BalanceSheetReport, GeneralLedgerReport, IncomeStatementReport, ReportService,
    TrialBalanceReport,
};

fn poisoned(what: &str) -> LedgerError {
    LedgerError::Internal(format!("{what} lock poisoned"))
}

/// A bookkeeping ledger shared between threads.
#[derive(Debug)]
pub struct Ledger {
    current: RwLock<Arc<LedgerStore>>,
    writer: Mutex<()>,
    config: LedgerConfig,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self::from_store(LedgerStore::new(), config)
    }

    /// Wraps a store loaded from persistence, rebuilding its indices.
    #[must_use]
    pub fn from_store(mut store: LedgerStore, config: LedgerConfig) -> Self {
        store.rebuild_indices();
        Self {
            current: RwLock::new(Arc::new(store)),
            writer: Mutex::new(()),
            config,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// A consistent, immutable view of the ledger.
    pub fn snapshot(&self) -> LedgerResult<Arc<LedgerStore>> {
        let current = self.current.read().map_err(|_| poisoned("ledger"))?;
        Ok(Arc::clone(&current))
    }

    /// Runs `op` as one all-or-nothing transaction.
    ///
    /// Writers are serialised. On `Err` the working copy is dropped and the
    /// published store is untouched. A writer that panicked never published
    /// its copy either, so a poisoned writer lock is taken over as is.
    pub fn transaction<T>(
        &self,
        op: impl FnOnce(&mut LedgerStore) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = LedgerStore::clone(&*self.snapshot()?);

        let value = op(&mut working)?;

        let mut current = self.current.write().map_err(|_| poisoned("ledger"))?;
        *current = Arc::new(working);
        Ok(value)
    }

    // ========== Chart of Accounts ==========

    /// Creates an account.
    pub fn create_account(&self, input: NewAccount) -> LedgerResult<Account> {
        self.transaction(|store| store.create_account(input).cloned())
    }

    /// Looks up an account.
    pub fn resolve_account(&self, code: &str) -> LedgerResult<Account> {
        self.snapshot()?.chart().resolve(code).cloned()
    }

    /// Renames an account.
    pub fn rename_account(&self, code: &str, label: &str) -> LedgerResult<()> {
        self.transaction(|store| store.rename_account(code, label))
    }

    /// Deactivates an account.
    pub fn deactivate_account(&self, code: &str) -> LedgerResult<()> {
        self.transaction(|store| store.deactivate_account(code))
    }

    /// Reactivates an account.
    pub fn reactivate_account(&self, code: &str) -> LedgerResult<()> {
        self.transaction(|store| store.reactivate_account(code))
    }

    /// Moves an account under `parent`, or to the root.
    pub fn set_account_parent(&self, code: &str, parent: Option<&str>) -> LedgerResult<()> {
        self.transaction(|store| store.set_account_parent(code, parent))
    }

    /// Reclassifies an account without postings.
    pub fn change_account_type(&self, code: &str, account_type: AccountType) -> LedgerResult<()> {
        self.transaction(|store| store.change_account_type(code, account_type))
    }

    /// Direct children of an account.
    pub fn children(&self, code: &str) -> LedgerResult<Vec<Account>> {
        let store = self.snapshot()?;
        store.chart().resolve(code)?;
        Ok(store.chart().children(code).cloned().collect())
    }

    /// Signed balance of an account, optionally as of a date.
    pub fn account_balance(&self, code: &str, as_of: Option<NaiveDate>) -> LedgerResult<Decimal> {
        self.snapshot()?.account_balance(code, as_of)
    }

    /// Balance of an account and its descendants, in the account's convention.
    pub fn subtree_balance(&self, code: &str) -> LedgerResult<Decimal> {
        self.snapshot()?.chart().subtree_balance(code)
    }

    // ========== Journals ==========

    /// Registers a journal.
    pub fn create_journal(
        &self,
        code: &str,
        label: &str,
        journal_type: JournalType,
    ) -> LedgerResult<Journal> {
        self.transaction(|store| store.create_journal(code, label, journal_type).cloned())
    }

    /// Looks up a journal.
    pub fn resolve_journal(&self, code: &str) -> LedgerResult<Journal> {
        self.snapshot()?.journals().resolve(code).cloned()
    }

    /// Deactivates a journal with no live entries in an open exercise.
    pub fn deactivate_journal(&self, code: &str) -> LedgerResult<()> {
        self.transaction(|store| store.deactivate_journal(code))
    }

    /// Reactivates a journal.
    pub fn reactivate_journal(&self, code: &str) -> LedgerResult<()> {
        self.transaction(|store| store.reactivate_journal(code))
    }

    // ========== Fiscal Calendar ==========

    /// Opens an exercise.
    pub fn create_exercise(
        &self,
        year: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Exercise> {
        self.transaction(|store| store.create_exercise(year, start, end).cloned())
    }

    /// Looks up an exercise by year label.
    pub fn exercise(&self, year: &str) -> LedgerResult<Exercise> {
        self.snapshot()?.calendar().exercise(year).cloned()
    }

    /// The exercise containing `date`.
    pub fn exercise_for(&self, date: NaiveDate) -> LedgerResult<Exercise> {
        self.snapshot()?.calendar().exercise_for(date).cloned()
    }

    /// Whether an entry dated `date` could be created now.
    pub fn is_open(&self, date: NaiveDate) -> LedgerResult<bool> {
        Ok(self.snapshot()?.calendar().is_open(date))
    }

    // ========== Entries ==========

    /// Records a DRAFT entry.
    pub fn create_entry(&self, input: NewEntry) -> LedgerResult<JournalEntry> {
        self.transaction(|store| store.create_entry(input).cloned())
    }

    /// Validates a DRAFT entry and applies it to the account totals.
    pub fn validate_entry(&self, id: EntryId, validator: ActorId) -> LedgerResult<JournalEntry> {
        self.transaction(|store| store.validate_entry(id, validator).cloned())
    }

    /// Cancels a DRAFT entry.
    pub fn cancel_entry(&self, id: EntryId) -> LedgerResult<JournalEntry> {
        self.transaction(|store| store.cancel_entry(id).cloned())
    }

    /// Posts the reversing entry of a validated entry.
    pub fn reverse_entry(
        &self,
        id: EntryId,
        date: NaiveDate,
        validator: ActorId,
    ) -> LedgerResult<JournalEntry> {
        self.transaction(|store| store.reverse_entry(id, date, validator).cloned())
    }

    /// Creates and validates a balanced batch.
    pub fn post_balanced(
        &self,
        lines: Vec<NewEntry>,
        validator: ActorId,
    ) -> LedgerResult<Vec<JournalEntry>> {
        self.transaction(|store| store.post_balanced(lines, validator))
    }

    /// Looks up an entry.
    pub fn entry(&self, id: EntryId) -> LedgerResult<JournalEntry> {
        self.snapshot()?.entry(id).cloned()
    }

    // ========== Reports ==========

    /// General ledger listing.
    pub fn general_ledger(
        &self,
        account_code: Option<&str>,
        range: Option<DateRange>,
    ) -> LedgerResult<GeneralLedgerReport> {
        ReportService::general_ledger(&*self.snapshot()?, account_code, range)
    }

    /// Trial balance.
    pub fn trial_balance(&self, range: Option<DateRange>) -> LedgerResult<TrialBalanceReport> {
        Ok(ReportService::trial_balance(&*self.snapshot()?, range))
    }

    /// Balance sheet as of a date.
    pub fn balance_sheet(&self, as_of: NaiveDate) -> LedgerResult<BalanceSheetReport> {
        Ok(ReportService::balance_sheet(&*self.snapshot()?, as_of))
    }

    /// Income statement over a range.
    pub fn income_statement(&self, range: DateRange) -> LedgerResult<IncomeStatementReport> {
        Ok(ReportService::income_statement(&*self.snapshot()?, range))
    }

    // ========== Closing ==========

    /// Moves a period to pending close.
    pub fn request_close(&self, year: &str, period: PeriodKey) -> LedgerResult<()> {
        self.transaction(|store| ClosingService::request_close(store, year, period))
    }

    /// Closes one period in a single transaction.
    pub fn close_period(
        &self,
        year: &str,
        period: PeriodKey,
        actor: ActorId,
        reconciliation: &dyn Reconciliation,
    ) -> LedgerResult<PeriodClosing> {
        self.transaction(|store| {
            ClosingService::close_period(store, &self.config, year, period, actor, reconciliation)
        })
    }

    /// Closes every remaining period of an exercise, oldest first.
    ///
    /// Each period is its own transaction: on failure the periods already
    /// closed stay closed and a retry picks up where it stopped.
    pub fn close_exercise(
        &self,
        year: &str,
        actor: ActorId,
        reconciliation: &dyn Reconciliation,
    ) -> LedgerResult<Vec<PeriodClosing>> {
        let exercise = self.exercise(year)?;
        if exercise.closed {
            let period = exercise
                .final_period()
                .ok_or_else(|| LedgerError::Internal(format!("exercise {year} has no periods")))?;
            return Err(LedgerError::AlreadyClosed {
                year: year.to_string(),
                period,
            });
        }

        let mut records = Vec::new();
        for period in exercise.unclosed_periods() {
            records.push(self.close_period(year, period, actor, reconciliation)?);
        }

        info!(year, periods = records.len(), "Exercise closed");
        Ok(records)
    }
}
