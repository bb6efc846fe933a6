//! Report data types.

use chrono::NaiveDate;
use grandlivre_shared::EntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::AccountType;
use crate::fiscal::DateRange;

/// Account balance for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account code.
    pub code: String,
    /// Account label.
    pub label: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Net balance under the account's normal-balance convention.
    pub balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Date filter, `None` for all time.
    pub range: Option<DateRange>,
    /// Accounts with validated activity in range, in code order.
    pub accounts: Vec<AccountBalance>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl TrialBalanceTotals {
    /// `total_debit - total_credit`.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// One line of the general ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerLine {
    /// Entry ID.
    pub entry_id: EntryId,
    /// Entry date.
    pub date: NaiveDate,
    /// Piece number.
    pub piece_no: String,
    /// Account code.
    pub account_code: String,
    /// Journal code.
    pub journal_code: String,
    /// Entry label.
    pub label: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this line, accumulated from the first line of the
    /// account in the listing.
    pub running_balance: Decimal,
}

/// General ledger ("grand livre") report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// Report type identifier.
    pub report_type: String,
    /// Account filter.
    pub account_code: Option<String>,
    /// Date filter.
    pub range: Option<DateRange>,
    /// Lines sorted by `(account_code, date, entry_id)`.
    pub lines: Vec<GeneralLedgerLine>,
    /// Total debit of the listing.
    pub total_debit: Decimal,
    /// Total credit of the listing.
    pub total_credit: Decimal,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report type identifier.
    pub report_type: String,
    /// As of date.
    pub as_of: NaiveDate,
    /// Asset accounts with a non-zero balance.
    pub assets: Vec<AccountBalance>,
    /// Liability accounts with a non-zero balance.
    pub liabilities: Vec<AccountBalance>,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period covered.
    pub range: DateRange,
    /// Revenue accounts with a non-zero balance.
    pub revenue: Vec<AccountBalance>,
    /// Expense accounts with a non-zero balance.
    pub expenses: Vec<AccountBalance>,
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expense.
    pub total_expense: Decimal,
    /// `total_revenue - total_expense`.
    pub net_result: Decimal,
}
