//! Property-based tests for the posting engine.
//!
//! - Balance invariant: summed debit totals equal summed credit totals
//! - Entry exclusivity: exactly one strictly positive side
//! - Closed-period rejection
//! - Immutability of validated entries

use chrono::NaiveDate;
use grandlivre_shared::{ActorId, Amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{EntryStatus, NewEntry};
use super::store::LedgerStore;
use crate::chart::{AccountType, NewAccount};
use crate::error::{ErrorKind, LedgerError};
use crate::fiscal::{PeriodKey, PeriodStatus};
use crate::journal::JournalType;

const ACCOUNTS: [&str; 4] = ["401", "512", "601", "701"];

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate any decimal amount, negative and zero included.
fn any_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
    ]
}

/// Strategy to generate a date inside 2024.
fn date_2024() -> impl Strategy<Value = NaiveDate> {
    (1u32..=12, 1u32..=28).prop_map(|(m, d)| NaiveDate::from_ymd_opt(2024, m, d).unwrap())
}

fn setup() -> LedgerStore {
    let mut store = LedgerStore::new();
    for (code, kind) in ACCOUNTS.iter().zip([
        AccountType::Liability,
        AccountType::Asset,
        AccountType::Expense,
        AccountType::Revenue,
    ]) {
        store
            .create_account(NewAccount::new(*code, *code, kind))
            .unwrap();
    }
    store
        .create_journal("OD", "Miscellaneous", JournalType::Miscellaneous)
        .unwrap();
    store
        .create_exercise(
            "2024",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Whatever mix of lines is created, validated or cancelled, the summed
    /// debit totals of all accounts equal the summed debits of validated
    /// entries, and the same for credits.
    #[test]
    fn prop_running_totals_match_validated_entries(
        lines in prop::collection::vec(
            (0usize..4, positive_amount(), any::<bool>(), date_2024(), 0u8..3),
            1..40,
        ),
    ) {
        let mut store = setup();
        let actor = ActorId::new();

        for (account, amount, is_debit, date, action) in lines {
            let input = if is_debit {
                NewEntry::debit(date, "P", ACCOUNTS[account], "OD", "Line", amount)
            } else {
                NewEntry::credit(date, "P", ACCOUNTS[account], "OD", "Line", amount)
            };
            let id = store.create_entry(input).unwrap().id;
            match action {
                0 => { store.validate_entry(id, actor).unwrap(); }
                1 => { store.cancel_entry(id).unwrap(); }
                _ => {}
            }
        }

        let account_debits: Amount = store.chart().iter().map(|a| a.debit_total).sum();
        let account_credits: Amount = store.chart().iter().map(|a| a.credit_total).sum();
        let validated = || store.entries().filter(|e| e.is_validated());
        let entry_debits: Amount = validated().map(|e| e.debit).sum();
        let entry_credits: Amount = validated().map(|e| e.credit).sum();

        prop_assert_eq!(account_debits, entry_debits);
        prop_assert_eq!(account_credits, entry_credits);
    }

    /// Balanced batches keep the whole ledger balanced.
    #[test]
    fn prop_balanced_batches_keep_books_balanced(
        batches in prop::collection::vec(
            (0usize..4, 0usize..4, positive_amount(), date_2024()),
            1..30,
        ),
    ) {
        let mut store = setup();
        let actor = ActorId::new();

        for (from, to, amount, date) in batches {
            store.post_balanced(
                vec![
                    NewEntry::debit(date, "B", ACCOUNTS[from], "OD", "Debit", amount),
                    NewEntry::credit(date, "B", ACCOUNTS[to], "OD", "Credit", amount),
                ],
                actor,
            ).unwrap();
        }

        let debits: Amount = store.chart().iter().map(|a| a.debit_total).sum();
        let credits: Amount = store.chart().iter().map(|a| a.credit_total).sum();
        prop_assert_eq!(debits, credits);
    }

    /// An entry is accepted iff exactly one side is strictly positive and the
    /// other exactly zero.
    #[test]
    fn prop_entry_exclusivity(debit in any_amount(), credit in any_amount(), date in date_2024()) {
        let mut store = setup();
        let result = store
            .create_entry(NewEntry::new(date, "P", "512", "OD", "Line", debit, credit))
            .map(|e| (e.debit.get(), e.credit.get()));

        let valid = (debit > Decimal::ZERO && credit.is_zero())
            || (credit > Decimal::ZERO && debit.is_zero());
        if valid {
            prop_assert_eq!(result, Ok((debit, credit)));
        } else {
            prop_assert_eq!(result, Err(LedgerError::InvalidAmount { debit, credit }));
            prop_assert_eq!(store.entry_count(), 0);
        }
    }

    /// Posting into a closed period always fails with a ClosedPeriod-kind
    /// error, whatever the account and journal.
    #[test]
    fn prop_closed_period_rejection(
        account in prop_oneof![Just("401"), Just("512"), Just("601"), Just("701"), Just("999")],
        journal in prop_oneof![Just("OD"), Just("ZZ")],
        amount in positive_amount(),
        date in date_2024(),
        exercise_closed in any::<bool>(),
    ) {
        let mut store = setup();
        let exercise = store.calendar.exercise_mut("2024").unwrap();
        if exercise_closed {
            exercise.closed = true;
        } else {
            exercise.periods.insert(PeriodKey::from_date(date), PeriodStatus::Closed);
        }

        let line = NewEntry::debit(date, "P", account, journal, "Line", amount);
        let result = store.create_entry(line);
        let err = result.unwrap_err();
        if account != "999" && journal != "ZZ" {
            prop_assert_eq!(err.kind(), ErrorKind::ClosedPeriod);
        } else {
            prop_assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        prop_assert_eq!(store.entry_count(), 0);
    }

    /// No engine operation alters a validated entry; reversal leaves it intact.
    #[test]
    fn prop_validated_entries_are_immutable(amount in positive_amount(), date in date_2024()) {
        let mut store = setup();
        let actor = ActorId::new();
        let id = store
            .create_entry(NewEntry::debit(date, "P", "601", "OD", "Line", amount))
            .unwrap()
            .id;
        let validated = store.validate_entry(id, actor).unwrap().clone();

        prop_assert!(store.validate_entry(id, actor).is_err());
        prop_assert!(store.cancel_entry(id).is_err());
        store.reverse_entry(id, date, actor).unwrap();
        prop_assert!(store.reverse_entry(id, date, actor).is_err());

        let after = store.entry(id).unwrap();
        prop_assert_eq!(after, &validated);
        prop_assert_eq!(after.status, EntryStatus::Validated);
        prop_assert!(store.account_balance("601", None).unwrap().is_zero());
    }
}
