//! Journal entry domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use grandlivre_shared::{ActorId, Amount, EntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::NormalBalance;
use crate::error::LedgerError;
use crate::fiscal::PeriodKey;

/// Entry status.
///
/// The valid transitions are:
/// - Draft → Validated (validate)
/// - Draft → Cancelled (cancel)
///
/// Validated entries are never edited; they are neutralised by a reversing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Recorded but invisible to balances and reports.
    Draft,
    /// Posted to the ledger (immutable).
    Validated,
    /// Abandoned draft (immutable).
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Validated => "validated",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "validated" => Some(Self::Validated),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the entry can still change status.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One debit or credit line against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Store-allocated identifier.
    pub id: EntryId,
    /// Accounting date.
    pub date: NaiveDate,
    /// External document / piece number.
    pub piece_no: String,
    /// Account posted to.
    pub account_code: String,
    /// Journal the entry is filed under.
    pub journal_code: String,
    /// Free text.
    pub label: String,
    /// Debit side (zero for a credit entry).
    pub debit: Amount,
    /// Credit side (zero for a debit entry).
    pub credit: Amount,
    /// Period key derived from `date` at creation.
    pub period: PeriodKey,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Who validated the entry.
    pub validated_by: Option<ActorId>,
    /// When the entry was validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Entry this one reverses.
    pub reverses: Option<EntryId>,
    /// Opaque cross-module references (e.g. source stock movement id).
    #[serde(default)]
    pub external_refs: BTreeMap<String, String>,
}

impl JournalEntry {
    /// Returns true if the entry participates in balances and reports.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.status == EntryStatus::Validated
    }

    /// Returns `debit - credit`.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit.get() - self.credit.get()
    }

    /// Signed amount under an account's normal-balance convention.
    #[must_use]
    pub fn normal_amount(&self, convention: NormalBalance) -> Decimal {
        convention.signed(self.debit.get(), self.credit.get())
    }
}

/// Input for creating a journal entry, as supplied by upstream producers.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Accounting date.
    pub date: NaiveDate,
    /// External document / piece number.
    pub piece_no: String,
    /// Account to post to.
    pub account_code: String,
    /// Journal to file under.
    pub journal_code: String,
    /// Free text.
    pub label: String,
    /// Debit amount (zero for a credit line).
    pub debit: Decimal,
    /// Credit amount (zero for a debit line).
    pub credit: Decimal,
    /// Opaque cross-module references.
    pub external_refs: BTreeMap<String, String>,
}

impl NewEntry {
    /// Creates an entry input with no external references.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        piece_no: impl Into<String>,
        account_code: impl Into<String>,
        journal_code: impl Into<String>,
        label: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            date,
            piece_no: piece_no.into(),
            account_code: account_code.into(),
            journal_code: journal_code.into(),
            label: label.into(),
            debit,
            credit,
            external_refs: BTreeMap::new(),
        }
    }

    /// Shorthand for a debit line.
    #[must_use]
    pub fn debit(
        date: NaiveDate,
        piece_no: impl Into<String>,
        account_code: impl Into<String>,
        journal_code: impl Into<String>,
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(date, piece_no, account_code, journal_code, label, amount, Decimal::ZERO)
    }

    /// Shorthand for a credit line.
    #[must_use]
    pub fn credit(
        date: NaiveDate,
        piece_no: impl Into<String>,
        account_code: impl Into<String>,
        journal_code: impl Into<String>,
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self::new(date, piece_no, account_code, journal_code, label, Decimal::ZERO, amount)
    }

    /// Attaches an opaque cross-module reference.
    #[must_use]
    pub fn with_reference(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_refs.insert(key.into(), value.into());
        self
    }
}

/// Checks that exactly one side is strictly positive and the other exactly zero.
///
/// # Errors
///
/// Returns `InvalidAmount` for negative amounts, both sides positive, or both zero.
pub fn validate_amounts(debit: Decimal, credit: Decimal) -> Result<(Amount, Amount), LedgerError> {
    let invalid = || LedgerError::InvalidAmount { debit, credit };
    let debit_amount = Amount::new(debit).map_err(|_| invalid())?;
    let credit_amount = Amount::new(credit).map_err(|_| invalid())?;
    if debit_amount.is_positive() == credit_amount.is_positive() {
        return Err(invalid());
    }
    Ok((debit_amount, credit_amount))
}
