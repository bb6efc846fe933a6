//! Account domain types.

use grandlivre_shared::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account classification.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Costs of the period.
    Expense,
    /// Income of the period.
    Revenue,
}

impl AccountType {
    /// Every account type, in reporting order.
    pub const ALL: [Self; 4] = [Self::Asset, Self::Liability, Self::Expense, Self::Revenue];

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Expense => "expense",
            Self::Revenue => "revenue",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "expense" => Some(Self::Expense),
            "revenue" => Some(Self::Revenue),
            _ => None,
        }
    }

    /// Side on which the account's balance is reported as positive.
    #[must_use]
    pub fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for balance sheet accounts.
    #[must_use]
    pub fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normal-balance convention.
///
/// - Asset/Expense: balance = debit - credit (debit-normal)
/// - Liability/Revenue: balance = credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Revenue).
    Credit,
}

impl NormalBalance {
    /// Signed balance of a debit/credit pair under this convention.
    #[must_use]
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// One line of the chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Numeric code, unique and immutable (e.g. "601000").
    pub code: String,
    /// Human readable label.
    pub label: String,
    /// Classification driving the sign convention.
    pub account_type: AccountType,
    /// Parent account code.
    pub parent: Option<String>,
    /// Cumulative debit of validated entries.
    pub debit_total: Amount,
    /// Cumulative credit of validated entries.
    pub credit_total: Amount,
    /// Soft-delete flag.
    pub active: bool,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Account {
    /// Signed running balance under the account's normal-balance convention.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.account_type
            .normal_balance()
            .signed(self.debit_total.get(), self.credit_total.get())
    }

    /// Returns true once a validated entry has touched the account.
    #[must_use]
    pub fn has_postings(&self) -> bool {
        self.debit_total.is_positive() || self.credit_total.is_positive()
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Numeric code.
    pub code: String,
    /// Label.
    pub label: String,
    /// Classification.
    pub account_type: AccountType,
    /// Optional parent code.
    pub parent_code: Option<String>,
    /// Free-form metadata.
    pub metadata: Map<String, Value>,
}

impl NewAccount {
    /// Creates an input without parent or metadata.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            account_type,
            parent_code: None,
            metadata: Map::new(),
        }
    }

    /// Sets the parent account code.
    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
