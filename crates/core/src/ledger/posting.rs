//! Entry posting engine.
//!
//! Entries are created as drafts, then validated (posted to the running
//! account totals) or cancelled. Validated entries are never edited: the only
//! way to neutralise one is a reversing entry.
//!
//! Every method here mutates the store in place and may leave it half-updated
//! on error. Callers go through [`crate::ledger::Ledger`], which runs each
//! operation on a private copy and only publishes it on success.

use chrono::{NaiveDate, Utc};
use grandlivre_shared::{ActorId, Amount, EntryId};
use tracing::{debug, info};

use super::entry::{EntryStatus, JournalEntry, NewEntry, validate_amounts};
use super::store::LedgerStore;
use super::validation::validate_batch;
use crate::error::LedgerError;
use crate::fiscal::PeriodKey;

impl LedgerStore {
    /// Records a new DRAFT entry.
    ///
    /// Checks, in order: amount exclusivity, account and journal (known and
    /// active), then that an open period of an open exercise covers the date.
    /// Balances are not touched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `AccountNotFound`, `JournalNotFound`,
    /// `AccountInactive`, `JournalInactive`, `NoExercise` or `ClosedPeriod`.
    pub fn create_entry(&mut self, input: NewEntry) -> Result<&JournalEntry, LedgerError> {
        let (debit, credit) = self.check_new_entry(&input)?;
        self.calendar.ensure_accepts_new_entries(input.date)?;
        let id = self.insert_draft(input, debit, credit, None);
        self.entry(id)
    }

    /// Posts a DRAFT entry to the ledger.
    ///
    /// The owning exercise and period are checked again here: they may have
    /// been closed since the draft was created.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `AlreadyValidated`, `AlreadyCancelled`,
    /// `NoExercise`, `ClosedPeriod` or `AmountOverflow`.
    pub fn validate_entry(
        &mut self,
        id: EntryId,
        validator: ActorId,
    ) -> Result<&JournalEntry, LedgerError> {
        let entry = self.entry(id)?;
        ensure_draft(entry)?;
        self.calendar.ensure_accepts_validation(entry.date)?;
        self.post(id, validator)
    }

    /// Cancels a DRAFT entry. Validated entries can only be reversed.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `AlreadyValidated`, `AlreadyCancelled`,
    /// `NoExercise` or `ClosedPeriod`.
    pub fn cancel_entry(&mut self, id: EntryId) -> Result<&JournalEntry, LedgerError> {
        let entry = self.entry(id)?;
        ensure_draft(entry)?;
        self.calendar.ensure_accepts_validation(entry.date)?;

        let entry = self.entry_mut(id)?;
        entry.status = EntryStatus::Cancelled;
        info!(entry_id = %id, account = %entry.account_code, "Journal entry cancelled");
        Ok(&*entry)
    }

    /// Posts and validates the equal-and-opposite of a validated entry.
    ///
    /// The reversal keeps the account and journal, swaps debit and credit and
    /// is dated `date`, which must fall in an open period.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `NotValidated`, `AlreadyReversed`, or any
    /// error `create_entry` returns for the reversing line.
    pub fn reverse_entry(
        &mut self,
        id: EntryId,
        date: NaiveDate,
        validator: ActorId,
    ) -> Result<&JournalEntry, LedgerError> {
        let original = self.entry(id)?;
        if !original.is_validated() {
            return Err(LedgerError::NotValidated(id));
        }
        if let Some(reversal) = self.reversal_of(id) {
            return Err(LedgerError::AlreadyReversed {
                entry: id,
                reversal,
            });
        }

        let input = NewEntry {
            date,
            piece_no: format!("REV-{}", original.piece_no),
            account_code: original.account_code.clone(),
            journal_code: original.journal_code.clone(),
            label: format!("Reversal: {}", original.label),
            debit: original.credit.get(),
            credit: original.debit.get(),
            external_refs: original.external_refs.clone(),
        };

        let (debit, credit) = self.check_new_entry(&input)?;
        self.calendar.ensure_accepts_new_entries(date)?;
        let reversal = self.insert_draft(input, debit, credit, Some(id));
        info!(entry_id = %id, reversal_id = %reversal, "Journal entry reversed");
        self.post(reversal, validator)
    }

    /// Creates and validates several lines as one unit.
    ///
    /// The batch is refused unless its debits equal its credits. Every line
    /// goes through the same checks as `create_entry`.
    ///
    /// # Errors
    ///
    /// Returns `UnbalancedBooks`, or the first error of any line.
    pub fn post_balanced(
        &mut self,
        lines: Vec<NewEntry>,
        validator: ActorId,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        let totals = validate_batch(&lines)?;

        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            ids.push(self.create_entry(line)?.id);
        }

        let mut posted = Vec::with_capacity(ids.len());
        for id in ids {
            posted.push(self.validate_entry(id, validator)?.clone());
        }

        info!(lines = posted.len(), total = %totals.debit, "Balanced batch posted");
        Ok(posted)
    }

    /// Creates and validates engine-generated lines (closing entries).
    ///
    /// Period status and active flags are not consulted: the closing workflow
    /// posts into the period it is about to freeze and must zero deactivated
    /// accounts too. The date must still fall inside an exercise that is not
    /// closed.
    pub(crate) fn post_generated(
        &mut self,
        lines: Vec<NewEntry>,
        validator: ActorId,
    ) -> Result<Vec<EntryId>, LedgerError> {
        validate_batch(&lines)?;

        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            let (debit, credit) = validate_amounts(line.debit, line.credit)?;
            self.chart.resolve(&line.account_code)?;
            self.journals.resolve(&line.journal_code)?;
            let exercise = self.calendar.exercise_for(line.date)?;
            if exercise.closed {
                return Err(LedgerError::ClosedPeriod {
                    date: line.date,
                    period: PeriodKey::from_date(line.date),
                });
            }
            let id = self.insert_draft(line, debit, credit, None);
            self.post(id, validator)?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn check_new_entry(&self, input: &NewEntry) -> Result<(Amount, Amount), LedgerError> {
        let amounts = validate_amounts(input.debit, input.credit)?;

        let account = self.chart.resolve(&input.account_code)?;
        if !account.active {
            return Err(LedgerError::AccountInactive(account.code.clone()));
        }
        let journal = self.journals.resolve(&input.journal_code)?;
        if !journal.active {
            return Err(LedgerError::JournalInactive(journal.code.clone()));
        }

        Ok(amounts)
    }

    fn insert_draft(
        &mut self,
        input: NewEntry,
        debit: Amount,
        credit: Amount,
        reverses: Option<EntryId>,
    ) -> EntryId {
        let id = self.allocate_entry_id();
        let entry = JournalEntry {
            id,
            date: input.date,
            piece_no: input.piece_no,
            account_code: input.account_code,
            journal_code: input.journal_code,
            label: input.label,
            debit,
            credit,
            period: PeriodKey::from_date(input.date),
            status: EntryStatus::Draft,
            validated_by: None,
            validated_at: None,
            created_at: Utc::now(),
            reverses,
            external_refs: input.external_refs,
        };

        debug!(
            entry_id = %id,
            account = %entry.account_code,
            journal = %entry.journal_code,
            date = %entry.date,
            debit = %entry.debit,
            credit = %entry.credit,
            "Journal entry created"
        );
        self.insert_entry(entry);
        id
    }

    /// Flips a draft to VALIDATED and applies it to the running totals.
    ///
    /// Refused with `AmountOverflow` before any total moves if the ledger's
    /// posted volume would leave the decimal range.
    fn post(&mut self, id: EntryId, validator: ActorId) -> Result<&JournalEntry, LedgerError> {
        let entry = self.entry(id)?;
        let (code, debit, credit) = (entry.account_code.clone(), entry.debit, entry.credit);
        let volume = self
            .posted_volume
            .checked_add(debit.get())
            .and_then(|v| v.checked_add(credit.get()))
            .ok_or_else(|| LedgerError::AmountOverflow {
                scope: "ledger".to_string(),
            })?;
        self.chart.apply_posting(&code, debit, credit)?;
        self.posted_volume = volume;

        let entry = self.entry_mut(id)?;
        entry.status = EntryStatus::Validated;
        entry.validated_by = Some(validator);
        entry.validated_at = Some(Utc::now());

        info!(
            entry_id = %id,
            account = %code,
            debit = %debit,
            credit = %credit,
            validator = %validator,
            "Journal entry validated"
        );
        Ok(&*entry)
    }
}

fn ensure_draft(entry: &JournalEntry) -> Result<(), LedgerError> {
    match entry.status {
        EntryStatus::Draft => Ok(()),
        EntryStatus::Validated => Err(LedgerError::AlreadyValidated(entry.id)),
        EntryStatus::Cancelled => Err(LedgerError::AlreadyCancelled(entry.id)),
    }
}
