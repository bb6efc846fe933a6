//! Account registry with hierarchy checks and running totals.

use std::collections::BTreeMap;

use grandlivre_shared::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountType, NewAccount};
use crate::error::LedgerError;

/// Flat account table; the hierarchy is held as parent codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    accounts: BTreeMap<String, Account>,
}

fn validate_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidAccountCode(code.to_string()));
    }
    Ok(())
}

impl ChartOfAccounts {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidAccountCode` if the code is not a numeric string
    /// - `DuplicateAccount` if the code exists
    /// - `UnknownParent` if the parent code does not resolve
    /// - `CyclicHierarchy` if the parent chain would include the account itself
    pub fn create_account(&mut self, input: NewAccount) -> Result<&Account, LedgerError> {
        validate_code(&input.code)?;
        if self.accounts.contains_key(&input.code) {
            return Err(LedgerError::DuplicateAccount(input.code));
        }
        if let Some(parent) = &input.parent_code {
            self.check_parent(&input.code, parent)?;
        }

        let account = Account {
            code: input.code.clone(),
            label: input.label,
            account_type: input.account_type,
            parent: input.parent_code,
            debit_total: Amount::ZERO,
            credit_total: Amount::ZERO,
            active: true,
            metadata: input.metadata,
        };
        Ok(self.accounts.entry(input.code).or_insert(account))
    }

    /// Looks up an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn resolve(&self, code: &str) -> Result<&Account, LedgerError> {
        self.accounts
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    fn resolve_mut(&mut self, code: &str) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    /// Adds a validated posting to the account's cumulative totals.
    ///
    /// Only the posting engine calls this, inside a ledger transaction.
    /// Totals are left untouched if either side would overflow.
    pub(crate) fn apply_posting(
        &mut self,
        code: &str,
        debit: Amount,
        credit: Amount,
    ) -> Result<(), LedgerError> {
        let account = self.resolve_mut(code)?;
        let overflow = || LedgerError::AmountOverflow {
            scope: format!("account {code}"),
        };
        let debit_total = account.debit_total.checked_add(debit).ok_or_else(overflow)?;
        let credit_total = account.credit_total.checked_add(credit).ok_or_else(overflow)?;
        account.debit_total = debit_total;
        account.credit_total = credit_total;
        Ok(())
    }

    /// Signed running balance of an account (normal-balance convention).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn balance(&self, code: &str) -> Result<Decimal, LedgerError> {
        Ok(self.resolve(code)?.balance())
    }

    /// Renames an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn rename(&mut self, code: &str, label: &str) -> Result<(), LedgerError> {
        self.resolve_mut(code)?.label = label.to_string();
        Ok(())
    }

    /// Sets the active flag of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn set_active(&mut self, code: &str, active: bool) -> Result<(), LedgerError> {
        self.resolve_mut(code)?.active = active;
        Ok(())
    }

    /// Moves an account under a new parent, or to the root with `None`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `UnknownParent` or `CyclicHierarchy`.
    pub fn set_parent(&mut self, code: &str, parent: Option<&str>) -> Result<(), LedgerError> {
        self.resolve(code)?;
        if let Some(parent) = parent {
            self.check_parent(code, parent)?;
        }
        self.resolve_mut(code)?.parent = parent.map(str::to_string);
        Ok(())
    }

    /// Changes the type of an account that has no postings yet.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountTypeLocked`.
    pub fn change_type(
        &mut self,
        code: &str,
        account_type: AccountType,
    ) -> Result<(), LedgerError> {
        let account = self.resolve_mut(code)?;
        if account.account_type == account_type {
            return Ok(());
        }
        if account.has_postings() {
            return Err(LedgerError::AccountTypeLocked(code.to_string()));
        }
        account.account_type = account_type;
        Ok(())
    }

    /// Direct children of an account.
    pub fn children<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Account> + 'a {
        self.accounts
            .values()
            .filter(move |a| a.parent.as_deref() == Some(code))
    }

    /// The account and all of its descendants, depth-first.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn subtree(&self, code: &str) -> Result<Vec<&Account>, LedgerError> {
        let root = self.resolve(code)?;
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(account) = stack.pop() {
            out.push(account);
            stack.extend(self.children(&account.code));
        }
        Ok(out)
    }

    /// Sum of the normal balances of an account and its descendants,
    /// expressed in the root account's sign convention.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn subtree_balance(&self, code: &str) -> Result<Decimal, LedgerError> {
        let nodes = self.subtree(code)?;
        let convention = nodes[0].account_type.normal_balance();
        Ok(nodes
            .iter()
            .map(|a| convention.signed(a.debit_total.get(), a.credit_total.get()))
            .sum())
    }

    /// Iterates over accounts in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Ensures `parent` exists and that `code` is not among its ancestors.
    ///
    /// The walk is bounded by the table size so a corrupted table cannot loop forever.
    fn check_parent(&self, code: &str, parent: &str) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(parent) {
            return Err(LedgerError::UnknownParent {
                code: code.to_string(),
                parent: parent.to_string(),
            });
        }
        let cycle = || LedgerError::CyclicHierarchy {
            code: code.to_string(),
            parent: parent.to_string(),
        };

        let mut current = Some(parent);
        for _ in 0..=self.accounts.len() {
            match current {
                None => return Ok(()),
                Some(c) if c == code => return Err(cycle()),
                Some(c) => current = self.accounts.get(c).and_then(|a| a.parent.as_deref()),
            }
        }
        Err(cycle())
    }
}
