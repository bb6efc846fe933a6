//! Business rule validation for batches of entry lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{NewEntry, validate_amounts};
use crate::error::LedgerError;

/// Debit and credit sums of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
}

impl BatchTotals {
    /// Sums the debit and credit columns.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if either column exceeds the decimal range.
    pub fn of(lines: &[NewEntry]) -> Result<Self, LedgerError> {
        lines.iter().try_fold(Self::default(), |totals, line| -> Result<Self, LedgerError> {
            Ok(Self {
                debit: checked_sum(totals.debit, line.debit)?,
                credit: checked_sum(totals.credit, line.credit)?,
            })
        })
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

fn checked_sum(total: Decimal, value: Decimal) -> Result<Decimal, LedgerError> {
    total
        .checked_add(value)
        .ok_or_else(|| LedgerError::AmountOverflow {
            scope: "batch".to_string(),
        })
}

/// Validates that a batch of lines can be posted together.
///
/// Every line must carry exactly one strictly positive side, and the batch
/// must balance exactly.
///
/// # Errors
///
/// Returns `InvalidAmount` for the first malformed line, `AmountOverflow` if
/// a column cannot be totalled and `UnbalancedBooks` if debits differ from
/// credits.
pub fn validate_batch(lines: &[NewEntry]) -> Result<BatchTotals, LedgerError> {
    for line in lines {
        validate_amounts(line.debit, line.credit)?;
    }

    let totals = BatchTotals::of(lines)?;
    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedBooks {
            scope: "batch".to_string(),
            debit: totals.debit,
            credit: totals.credit,
            delta: totals.difference(),
        });
    }

    Ok(totals)
}
