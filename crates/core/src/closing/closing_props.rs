//! Property-based tests for the closing workflow.
//!
//! - Idempotent closing: a second close posts nothing and reports `AlreadyClosed`
//! - Year-end closing zeroes revenue and expense into the result account

use chrono::NaiveDate;
use grandlivre_shared::{ActorId, LedgerConfig};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::ClosingService;
use super::types::AlwaysReconciled;
use crate::chart::{AccountType, NewAccount};
use crate::error::LedgerError;
use crate::fiscal::PeriodKey;
use crate::journal::JournalType;
use crate::ledger::{LedgerStore, NewEntry};
use crate::reports::ReportService;

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A date inside the first quarter of 2024.
fn q1_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=3, 1u32..=28).prop_map(|(m, d)| NaiveDate::from_ymd_opt(2024, m, d).unwrap())
}

fn setup() -> LedgerStore {
    let mut store = LedgerStore::new();
    for (code, kind) in [
        ("401", AccountType::Liability),
        ("411", AccountType::Asset),
        ("601", AccountType::Expense),
        ("701", AccountType::Revenue),
    ] {
        store
            .create_account(NewAccount::new(code, code, kind))
            .unwrap();
    }
    store
        .create_journal("OD", "Miscellaneous", JournalType::Miscellaneous)
        .unwrap();
    store
        .create_exercise(
            "2024",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
    store
}

fn close(store: &mut LedgerStore, month: u32) -> Result<super::PeriodClosing, LedgerError> {
    ClosingService::close_period(
        store,
        &LedgerConfig::default(),
        "2024",
        PeriodKey::new(2024, month).unwrap(),
        ActorId::new(),
        &AlwaysReconciled,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Closing the same period twice succeeds once and posts nothing the second time.
    #[test]
    fn prop_closing_is_idempotent(
        activity in prop::collection::vec((any::<bool>(), positive_amount(), q1_date()), 0..20),
    ) {
        let mut store = setup();
        let actor = ActorId::new();
        for (is_sale, amount, date) in activity {
            let (debit, credit) = if is_sale { ("411", "701") } else { ("601", "401") };
            store.post_balanced(
                vec![
                    NewEntry::debit(date, "P", debit, "OD", "Line", amount),
                    NewEntry::credit(date, "P", credit, "OD", "Line", amount),
                ],
                actor,
            ).unwrap();
        }

        for month in 1..=3 {
            close(&mut store, month).unwrap();
            let entries = store.entry_count();
            let closings = store.closings().len();

            let err = close(&mut store, month).unwrap_err();
            prop_assert_eq!(
                err,
                LedgerError::AlreadyClosed {
                    year: "2024".into(),
                    period: PeriodKey::new(2024, month).unwrap(),
                }
            );
            prop_assert_eq!(store.entry_count(), entries);
            prop_assert_eq!(store.closings().len(), closings);
        }
    }

    /// After the final period closes, revenue and expense accounts are zero,
    /// the result account holds the year's net result and the books stay balanced.
    #[test]
    fn prop_year_end_transfers_net_result(
        activity in prop::collection::vec((any::<bool>(), positive_amount(), q1_date()), 1..20),
    ) {
        let mut store = setup();
        let actor = ActorId::new();
        for (is_sale, amount, date) in activity {
            let (debit, credit) = if is_sale { ("411", "701") } else { ("601", "401") };
            store.post_balanced(
                vec![
                    NewEntry::debit(date, "P", debit, "OD", "Line", amount),
                    NewEntry::credit(date, "P", credit, "OD", "Line", amount),
                ],
                actor,
            ).unwrap();
        }
        let range = store.calendar().exercise("2024").unwrap().range();
        let expected = ReportService::income_statement(&store, range).net_result;

        close(&mut store, 1).unwrap();
        close(&mut store, 2).unwrap();
        let record = close(&mut store, 3).unwrap();

        prop_assert!(record.exercise_closed);
        prop_assert_eq!(record.net_result, Some(expected));
        prop_assert_eq!(store.account_balance("601", None).unwrap(), Decimal::ZERO);
        prop_assert_eq!(store.account_balance("701", None).unwrap(), Decimal::ZERO);
        let result = store.account_balance("120000", None).unwrap_or(Decimal::ZERO);
        prop_assert_eq!(result, expected);
        prop_assert!(ReportService::trial_balance(&store, None).totals.is_balanced);
        prop_assert_eq!(ReportService::income_statement(&store, range).net_result, expected);
    }
}
