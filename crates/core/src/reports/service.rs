//! Report generation service.
//!
//! Every report is a pure function of a store snapshot. Only VALIDATED
//! entries are read; drafts and cancelled entries never show up.
//!
//! Every total here is bounded by the store's posted volume, which posting
//! keeps inside the decimal range, so plain sums cannot overflow.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{
    AccountBalance, BalanceSheetReport, GeneralLedgerLine, GeneralLedgerReport,
    IncomeStatementReport, TrialBalanceReport, TrialBalanceTotals,
};
use crate::chart::AccountType;
use crate::error::LedgerError;
use crate::fiscal::DateRange;
use crate::journal::JournalType;
use crate::ledger::{JournalEntry, LedgerStore, RunningBalance};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates the general ledger.
    ///
    /// Lines are sorted by `(account_code, date, entry_id)`. The running
    /// balance restarts at zero on the first line of each account in the
    /// listing, so a date filter shows period-local accumulation rather than
    /// lifetime balances.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if `account_code` is given and unknown.
    pub fn general_ledger(
        store: &LedgerStore,
        account_code: Option<&str>,
        range: Option<DateRange>,
    ) -> Result<GeneralLedgerReport, LedgerError> {
        let selected: Vec<&JournalEntry> = match account_code {
            Some(code) => {
                store.chart().resolve(code)?;
                store
                    .account_entries(code, range)
                    .filter(|e| e.is_validated())
                    .collect()
            }
            None => store
                .entries_by_account()
                .filter(|e| e.is_validated() && in_range(range, e.date))
                .collect(),
        };

        let mut lines = Vec::with_capacity(selected.len());
        let mut current: Option<(&str, RunningBalance)> = None;
        for entry in selected {
            let convention = store
                .chart()
                .resolve(&entry.account_code)?
                .account_type
                .normal_balance();

            let running = match current {
                Some((code, running)) if code == entry.account_code => running,
                _ => RunningBalance::start(),
            }
            .next(entry.normal_amount(convention));
            current = Some((entry.account_code.as_str(), running));

            lines.push(GeneralLedgerLine {
                entry_id: entry.id,
                date: entry.date,
                piece_no: entry.piece_no.clone(),
                account_code: entry.account_code.clone(),
                journal_code: entry.journal_code.clone(),
                label: entry.label.clone(),
                debit: entry.debit.get(),
                credit: entry.credit.get(),
                running_balance: running.current_balance,
            });
        }

        let total_debit = lines.iter().map(|l| l.debit).sum();
        let total_credit = lines.iter().map(|l| l.credit).sum();

        Ok(GeneralLedgerReport {
            report_type: "general_ledger".to_string(),
            account_code: account_code.map(str::to_string),
            range,
            lines,
            total_debit,
            total_credit,
        })
    }

    /// Generates a trial balance for every account with validated activity in range.
    ///
    /// The trial balance verifies that total debits equal total credits.
    #[must_use]
    pub fn trial_balance(store: &LedgerStore, range: Option<DateRange>) -> TrialBalanceReport {
        let accounts = Self::aggregate(
            store,
            store
                .entries_by_account()
                .filter(|e| e.is_validated() && in_range(range, e.date)),
        );

        let total_debit: Decimal = accounts.iter().map(|a| a.total_debit).sum();
        let total_credit: Decimal = accounts.iter().map(|a| a.total_credit).sum();

        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            range,
            accounts,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        }
    }

    /// Generates a balance sheet as of a date.
    ///
    /// Only ASSET and LIABILITY accounts with a non-zero balance are listed.
    #[must_use]
    pub fn balance_sheet(store: &LedgerStore, as_of: NaiveDate) -> BalanceSheetReport {
        let accounts = Self::aggregate(
            store,
            store
                .entries_by_account()
                .filter(|e| e.is_validated() && e.date <= as_of),
        );

        let assets = Self::section(&accounts, AccountType::Asset);
        let liabilities = Self::section(&accounts, AccountType::Liability);

        BalanceSheetReport {
            report_type: "balance_sheet".to_string(),
            as_of,
            total_assets: assets.iter().map(|a| a.balance).sum(),
            total_liabilities: liabilities.iter().map(|a| a.balance).sum(),
            assets,
            liabilities,
        }
    }

    /// Generates an income statement over a date range.
    ///
    /// Entries of closing journals are left out, so the result of a closed
    /// exercise stays readable.
    #[must_use]
    pub fn income_statement(store: &LedgerStore, range: DateRange) -> IncomeStatementReport {
        let accounts = Self::aggregate(
            store,
            store.entries_by_account().filter(|e| {
                e.is_validated()
                    && range.contains(e.date)
                    && store
                        .journals()
                        .resolve(&e.journal_code)
                        .is_ok_and(|j| j.journal_type != JournalType::Closing)
            }),
        );

        let revenue = Self::section(&accounts, AccountType::Revenue);
        let expenses = Self::section(&accounts, AccountType::Expense);
        let total_revenue: Decimal = revenue.iter().map(|a| a.balance).sum();
        let total_expense: Decimal = expenses.iter().map(|a| a.balance).sum();

        IncomeStatementReport {
            report_type: "income_statement".to_string(),
            range,
            revenue,
            expenses,
            total_revenue,
            total_expense,
            net_result: total_revenue - total_expense,
        }
    }

    /// Sums entries per account, in code order.
    fn aggregate<'a>(
        store: &LedgerStore,
        entries: impl Iterator<Item = &'a JournalEntry>,
    ) -> Vec<AccountBalance> {
        let mut totals: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for entry in entries {
            let slot = totals.entry(entry.account_code.as_str()).or_default();
            slot.0 += entry.debit.get();
            slot.1 += entry.credit.get();
        }

        totals
            .into_iter()
            .filter_map(|(code, (total_debit, total_credit))| {
                let account = store.chart().resolve(code).ok()?;
                Some(AccountBalance {
                    code: account.code.clone(),
                    label: account.label.clone(),
                    account_type: account.account_type,
                    total_debit,
                    total_credit,
                    balance: account
                        .account_type
                        .normal_balance()
                        .signed(total_debit, total_credit),
                })
            })
            .collect()
    }

    fn section(accounts: &[AccountBalance], account_type: AccountType) -> Vec<AccountBalance> {
        accounts
            .iter()
            .filter(|a| a.account_type == account_type && !a.balance.is_zero())
            .cloned()
            .collect()
    }
}

fn in_range(range: Option<DateRange>, date: NaiveDate) -> bool {
    range.is_none_or(|r| r.contains(date))
}
