//! Closing workflow types.

use chrono::{DateTime, Utc};
use grandlivre_shared::{ActorId, EntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::AccountType;
use crate::fiscal::{Exercise, PeriodKey};
use crate::ledger::LedgerStore;

/// Validated activity of one account type over a closed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    /// Account type.
    pub account_type: AccountType,
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Net under the type's normal-balance convention.
    pub balance: Decimal,
}

/// Record of one successful period close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClosing {
    /// Exercise year label.
    pub exercise: String,
    /// Period closed.
    pub period: PeriodKey,
    /// Per-type totals of the period, before closing entries.
    pub totals: Vec<TypeTotals>,
    /// Total debit of the period.
    pub total_debit: Decimal,
    /// Total credit of the period.
    pub total_credit: Decimal,
    /// Closing entries generated (empty for intermediate periods).
    pub closing_entries: Vec<EntryId>,
    /// Net result transferred to the result account, if the exercise closed.
    pub net_result: Option<Decimal>,
    /// Whether this close also closed the exercise.
    pub exercise_closed: bool,
    /// Who closed the period.
    pub closed_by: ActorId,
    /// When the period was closed.
    pub closed_at: DateTime<Utc>,
}

/// Closing precondition supplied by the caller: bank and cash accounts tied out.
///
/// Returns the codes of the accounts that are not reconciled for the period;
/// an empty list lets the close proceed.
pub trait Reconciliation {
    /// Lists unreconciled account codes.
    fn unreconciled_accounts(
        &self,
        exercise: &Exercise,
        period: PeriodKey,
        store: &LedgerStore,
    ) -> Vec<String>;
}

/// Reconciliation that never objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReconciled;

impl Reconciliation for AlwaysReconciled {
    fn unreconciled_accounts(
        &self,
        _exercise: &Exercise,
        _period: PeriodKey,
        _store: &LedgerStore,
    ) -> Vec<String> {
        Vec::new()
    }
}

impl<F> Reconciliation for F
where
    F: Fn(&Exercise, PeriodKey, &LedgerStore) -> Vec<String>,
{
    fn unreconciled_accounts(
        &self,
        exercise: &Exercise,
        period: PeriodKey,
        store: &LedgerStore,
    ) -> Vec<String> {
        self(exercise, period, store)
    }
}
