//! Period and exercise closing.
//!
//! A period moves `Open → PendingClose → Closed` (or straight to `Closed`).
//! Before a period closes:
//! 1. every earlier period of the exercise is closed
//! 2. no DRAFT entry is dated inside the period
//! 3. the period's trial balance is equilibrated within the configured
//!    tolerance (exactly, when the tolerance is zero)
//! 4. the caller's reconciliation capability reports nothing outstanding
//!
//! Closing the final period also closes the exercise: revenue and expense
//! accounts are zeroed into the result account by entries in the closing
//! journal, dated on the last day of the exercise.

use chrono::Utc;
use grandlivre_shared::{ActorId, EntryId, LedgerConfig};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::types::{PeriodClosing, Reconciliation, TypeTotals};
use crate::chart::{AccountType, NewAccount};
use crate::error::LedgerError;
use crate::fiscal::{Exercise, PeriodKey, PeriodStatus};
use crate::journal::JournalType;
use crate::ledger::{EntryStatus, LedgerStore, NewEntry};
use crate::reports::{ReportService, TrialBalanceReport};

/// Stateless service running the closing workflow against a store.
pub struct ClosingService;

impl ClosingService {
    /// Marks an open period as pending close.
    ///
    /// New entries are refused from then on; existing drafts may still be
    /// validated or cancelled. Requesting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotFound`, `PeriodNotFound` or `AlreadyClosed`.
    pub fn request_close(
        store: &mut LedgerStore,
        year: &str,
        period: PeriodKey,
    ) -> Result<(), LedgerError> {
        let exercise = store.calendar.exercise_mut(year)?;
        match exercise.require_period(period)? {
            PeriodStatus::Closed => Err(LedgerError::AlreadyClosed {
                year: year.to_string(),
                period,
            }),
            PeriodStatus::PendingClose => Ok(()),
            PeriodStatus::Open => {
                exercise.periods.insert(period, PeriodStatus::PendingClose);
                info!(year, %period, "Period close requested");
                Ok(())
            }
        }
    }

    /// Closes one period, and the exercise with it if it is the final period.
    ///
    /// Re-invoking on a closed period returns `AlreadyClosed` and posts nothing.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotFound`, `PeriodNotFound`, `AlreadyClosed`,
    /// `EarlierPeriodsOpen`, `PendingEntries`, `UnbalancedBooks` or `Unreconciled`.
    /// Closing the final period also returns `ClosingJournalMismatch` or
    /// `ResultAccountMismatch` when a configured target exists with the wrong type.
    pub fn close_period(
        store: &mut LedgerStore,
        config: &LedgerConfig,
        year: &str,
        period: PeriodKey,
        actor: ActorId,
        reconciliation: &dyn Reconciliation,
    ) -> Result<PeriodClosing, LedgerError> {
        let exercise = store.calendar.exercise(year)?.clone();
        let trial = Self::check_guards(store, config, &exercise, period, reconciliation)?;
        let is_final = exercise.final_period() == Some(period);

        let (closing_entries, net_result) = if is_final {
            let (ids, net) = Self::post_closing_entries(store, config, &exercise, actor)?;
            (ids, Some(net))
        } else {
            (Vec::new(), None)
        };

        let closed_at = Utc::now();
        let exercise = store.calendar.exercise_mut(year)?;
        exercise.periods.insert(period, PeriodStatus::Closed);
        if is_final {
            exercise.closed = true;
            exercise.closed_at = Some(closed_at);
            exercise.closed_by = Some(actor);
        }

        let record = PeriodClosing {
            exercise: year.to_string(),
            period,
            totals: Self::type_totals(&trial),
            total_debit: trial.totals.total_debit,
            total_credit: trial.totals.total_credit,
            closing_entries,
            net_result,
            exercise_closed: is_final,
            closed_by: actor,
            closed_at,
        };
        store.closings.push(record.clone());

        info!(
            year,
            %period,
            closing_entries = record.closing_entries.len(),
            exercise_closed = is_final,
            closed_by = %actor,
            "Period closed"
        );
        Ok(record)
    }

    /// Runs every closing guard, returning the period's trial balance.
    fn check_guards(
        store: &LedgerStore,
        config: &LedgerConfig,
        exercise: &Exercise,
        period: PeriodKey,
        reconciliation: &dyn Reconciliation,
    ) -> Result<TrialBalanceReport, LedgerError> {
        if exercise.require_period(period)? == PeriodStatus::Closed {
            return Err(LedgerError::AlreadyClosed {
                year: exercise.year.clone(),
                period,
            });
        }

        if let Some(earlier) = exercise.first_unclosed_before(period) {
            warn!(year = %exercise.year, %period, %earlier, "Close refused: earlier period open");
            return Err(LedgerError::EarlierPeriodsOpen { period, earlier });
        }

        let range = exercise.period_range(period);
        let count = store
            .period_entries(period)
            .filter(|e| e.status == EntryStatus::Draft && range.contains(e.date))
            .count();
        if count > 0 {
            warn!(year = %exercise.year, %period, count, "Close refused: draft entries remain");
            return Err(LedgerError::PendingEntries { period, count });
        }

        let trial = ReportService::trial_balance(store, Some(range));
        let delta = trial.totals.delta();
        if !within_tolerance(delta, config.balance_tolerance) {
            warn!(year = %exercise.year, %period, %delta, "Close refused: books unbalanced");
            return Err(LedgerError::UnbalancedBooks {
                scope: period.to_string(),
                debit: trial.totals.total_debit,
                credit: trial.totals.total_credit,
                delta,
            });
        }

        let accounts = reconciliation.unreconciled_accounts(exercise, period, store);
        if !accounts.is_empty() {
            warn!(
                year = %exercise.year,
                %period,
                ?accounts,
                "Close refused: unreconciled accounts"
            );
            return Err(LedgerError::Unreconciled { period, accounts });
        }

        Ok(trial)
    }

    /// Zeroes revenue and expense accounts over the exercise into the result account.
    ///
    /// Returns the generated entry ids and the net result (profit positive).
    fn post_closing_entries(
        store: &mut LedgerStore,
        config: &LedgerConfig,
        exercise: &Exercise,
        actor: ActorId,
    ) -> Result<(Vec<EntryId>, Decimal), LedgerError> {
        Self::check_closing_targets(store, config)?;
        let range = exercise.range();
        let journal = config.closing_journal_code.as_str();
        let piece = format!("CLOSE-{}", exercise.year);

        let mut lines = Vec::new();
        let mut net = Decimal::ZERO;
        for account in store
            .chart()
            .iter()
            .filter(|a| !a.account_type.is_balance_sheet())
        {
            let raw: Decimal = store
                .account_entries(&account.code, Some(range))
                .filter(|e| e.is_validated())
                .map(|e| e.signed_amount())
                .sum();
            let label = format!("Closing {} {}", account.code, exercise.year);
            if raw > Decimal::ZERO {
                lines.push(NewEntry::credit(range.end, &piece, &account.code, journal, label, raw));
            } else if raw < Decimal::ZERO {
                lines.push(NewEntry::debit(range.end, &piece, &account.code, journal, label, -raw));
            }
            net -= raw;
        }

        if lines.is_empty() {
            return Ok((Vec::new(), Decimal::ZERO));
        }

        let result_account = config.result_account_code.as_str();
        let label = format!("Result of exercise {}", exercise.year);
        if net > Decimal::ZERO {
            lines.push(NewEntry::credit(range.end, &piece, result_account, journal, label, net));
        } else if net < Decimal::ZERO {
            lines.push(NewEntry::debit(range.end, &piece, result_account, journal, label, -net));
        }

        Self::ensure_closing_targets(store, config, net)?;
        let ids = store.post_generated(lines, actor)?;
        info!(year = %exercise.year, entries = ids.len(), %net, "Closing entries posted");
        Ok((ids, net))
    }

    /// Refuses a configured closing journal or result account that exists
    /// with the wrong type.
    fn check_closing_targets(
        store: &LedgerStore,
        config: &LedgerConfig,
    ) -> Result<(), LedgerError> {
        let code = config.closing_journal_code.as_str();
        if let Ok(journal) = store.journals().resolve(code)
            && journal.journal_type != JournalType::Closing
        {
            return Err(LedgerError::ClosingJournalMismatch {
                code: code.to_string(),
                found: journal.journal_type,
            });
        }

        let code = config.result_account_code.as_str();
        if let Ok(account) = store.chart().resolve(code)
            && account.account_type != AccountType::Liability
        {
            return Err(LedgerError::ResultAccountMismatch {
                code: code.to_string(),
                found: account.account_type,
            });
        }
        Ok(())
    }

    /// Creates the closing journal and result account on first use.
    fn ensure_closing_targets(
        store: &mut LedgerStore,
        config: &LedgerConfig,
        net: Decimal,
    ) -> Result<(), LedgerError> {
        let code = config.closing_journal_code.as_str();
        if store.journals().resolve(code).is_err() {
            store.create_journal(code, &config.closing_journal_label, JournalType::Closing)?;
        }

        let code = config.result_account_code.as_str();
        if !net.is_zero() && store.chart().resolve(code).is_err() {
            store.create_account(NewAccount::new(
                code,
                config.result_account_label.as_str(),
                AccountType::Liability,
            ))?;
        }
        Ok(())
    }

    fn type_totals(trial: &TrialBalanceReport) -> Vec<TypeTotals> {
        AccountType::ALL
            .into_iter()
            .filter_map(|account_type| {
                let rows: Vec<_> = trial
                    .accounts
                    .iter()
                    .filter(|a| a.account_type == account_type)
                    .collect();
                if rows.is_empty() {
                    return None;
                }
                let total_debit: Decimal = rows.iter().map(|a| a.total_debit).sum();
                let total_credit: Decimal = rows.iter().map(|a| a.total_credit).sum();
                Some(TypeTotals {
                    account_type,
                    total_debit,
                    total_credit,
                    balance: account_type
                        .normal_balance()
                        .signed(total_debit, total_credit),
                })
            })
            .collect()
    }
}

/// Debit/credit gap accepted when closing. A zero tolerance means exact equality.
fn within_tolerance(delta: Decimal, tolerance: Decimal) -> bool {
    delta.is_zero() || delta.abs() < tolerance
}
