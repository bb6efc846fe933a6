//! Tests for the closing workflow.

use chrono::NaiveDate;
use grandlivre_shared::{ActorId, LedgerConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::ClosingService;
use super::types::{AlwaysReconciled, Reconciliation};
use crate::chart::{AccountType, NewAccount};
use crate::error::{ErrorKind, LedgerError};
use crate::fiscal::{Exercise, PeriodKey, PeriodStatus};
use crate::journal::JournalType;
use crate::ledger::{LedgerStore, NewEntry};
use crate::reports::ReportService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn key(y: i32, m: u32) -> PeriodKey {
    PeriodKey::new(y, m).unwrap()
}

/// Exercise running from 2024-01-01 to 2024-03-31 (three periods).
fn setup() -> LedgerStore {
    let mut store = LedgerStore::new();
    for (code, label, kind) in [
        ("401", "Suppliers", AccountType::Liability),
        ("411", "Customers", AccountType::Asset),
        ("601", "Purchases", AccountType::Expense),
        ("701", "Sales", AccountType::Revenue),
    ] {
        store
            .create_account(NewAccount::new(code, label, kind))
            .unwrap();
    }
    store
        .create_journal("AC", "Purchases", JournalType::Purchases)
        .unwrap();
    store
        .create_journal("VT", "Sales", JournalType::Sales)
        .unwrap();
    store
        .create_exercise("2024", date(2024, 1, 1), date(2024, 3, 31))
        .unwrap();
    store
}

fn purchase(store: &mut LedgerStore, day: NaiveDate, amount: Decimal) {
    store
        .post_balanced(
            vec![
                NewEntry::debit(day, "F", "601", "AC", "Purchase", amount),
                NewEntry::credit(day, "F", "401", "AC", "Supplier", amount),
            ],
            ActorId::new(),
        )
        .unwrap();
}

fn sale(store: &mut LedgerStore, day: NaiveDate, amount: Decimal) {
    store
        .post_balanced(
            vec![
                NewEntry::debit(day, "V", "411", "VT", "Customer", amount),
                NewEntry::credit(day, "V", "701", "VT", "Sale", amount),
            ],
            ActorId::new(),
        )
        .unwrap();
}

fn close(store: &mut LedgerStore, period: PeriodKey) -> Result<super::PeriodClosing, LedgerError> {
    close_with(store, &LedgerConfig::default(), period)
}

fn close_with(
    store: &mut LedgerStore,
    config: &LedgerConfig,
    period: PeriodKey,
) -> Result<super::PeriodClosing, LedgerError> {
    ClosingService::close_period(store, config, "2024", period, ActorId::new(), &AlwaysReconciled)
}

fn status(store: &LedgerStore, period: PeriodKey) -> Option<PeriodStatus> {
    store
        .calendar()
        .exercise("2024")
        .unwrap()
        .period_status(period)
}

#[test]
fn test_close_intermediate_period() {
    let mut store = setup();
    purchase(&mut store, date(2024, 1, 5), dec!(1000));
    sale(&mut store, date(2024, 1, 10), dec!(1500));

    let record = close(&mut store, key(2024, 1)).unwrap();

    assert!(record.closing_entries.is_empty());
    assert!(!record.exercise_closed);
    assert_eq!(record.net_result, None);
    assert_eq!(record.total_debit, dec!(2500));
    let revenue = record
        .totals
        .iter()
        .find(|t| t.account_type == AccountType::Revenue)
        .unwrap();
    assert_eq!(revenue.balance, dec!(1500));

    assert_eq!(status(&store, key(2024, 1)), Some(PeriodStatus::Closed));
    assert!(!store.calendar().exercise("2024").unwrap().closed);
    assert_eq!(store.closings().len(), 1);

    let err = store
        .create_entry(NewEntry::debit(date(2024, 1, 20), "X", "601", "AC", "", dec!(1)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClosedPeriod);
}

#[test]
fn test_close_twice_is_already_closed() {
    let mut store = setup();
    purchase(&mut store, date(2024, 1, 5), dec!(100));

    close(&mut store, key(2024, 1)).unwrap();
    let entries = store.entry_count();

    assert_eq!(
        close(&mut store, key(2024, 1)).unwrap_err(),
        LedgerError::AlreadyClosed {
            year: "2024".into(),
            period: key(2024, 1)
        }
    );
    assert_eq!(store.entry_count(), entries);
    assert_eq!(store.closings().len(), 1);
}

#[test]
fn test_pending_entries_guard() {
    let mut store = setup();
    let id = store
        .create_entry(NewEntry::debit(date(2024, 1, 5), "F", "601", "AC", "Draft", dec!(100)))
        .unwrap()
        .id;

    assert_eq!(
        close(&mut store, key(2024, 1)).unwrap_err(),
        LedgerError::PendingEntries {
            period: key(2024, 1),
            count: 1
        }
    );
    assert_eq!(status(&store, key(2024, 1)), Some(PeriodStatus::Open));

    store.cancel_entry(id).unwrap();
    close(&mut store, key(2024, 1)).unwrap();
}

#[test]
fn test_unbalanced_guard_and_tolerance() {
    let mut store = setup();
    let actor = ActorId::new();
    let id = store
        .create_entry(NewEntry::debit(date(2024, 1, 5), "F", "601", "AC", "", dec!(100)))
        .unwrap()
        .id;
    store.validate_entry(id, actor).unwrap();

    let err = close(&mut store, key(2024, 1)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::UnbalancedBooks {
            scope: "2024-01".into(),
            debit: dec!(100),
            credit: dec!(0),
            delta: dec!(100),
        }
    );

    let id = store
        .create_entry(NewEntry::credit(date(2024, 1, 6), "F", "401", "AC", "", dec!(99.995)))
        .unwrap()
        .id;
    store.validate_entry(id, actor).unwrap();
    close(&mut store, key(2024, 1)).unwrap();
}

#[test]
fn test_periods_close_in_order() {
    let mut store = setup();
    assert_eq!(
        close(&mut store, key(2024, 2)).unwrap_err(),
        LedgerError::EarlierPeriodsOpen {
            period: key(2024, 2),
            earlier: key(2024, 1)
        }
    );
    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
}

#[test]
fn test_unreconciled_guard() {
    let mut store = setup();
    let bank_check = |_: &Exercise, _: PeriodKey, _: &LedgerStore| vec!["512".to_string()];

    let err = ClosingService::close_period(
        &mut store,
        &LedgerConfig::default(),
        "2024",
        key(2024, 1),
        ActorId::new(),
        &bank_check,
    )
    .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Unreconciled {
            period: key(2024, 1),
            accounts: vec!["512".into()]
        }
    );
    assert_eq!(err.kind(), ErrorKind::Unreconciled);
    assert!(AlwaysReconciled
        .unreconciled_accounts(
            store.calendar().exercise("2024").unwrap(),
            key(2024, 1),
            &store
        )
        .is_empty());
}

#[test]
fn test_request_close_drains_then_closes() {
    let mut store = setup();
    let id = store
        .create_entry(NewEntry::debit(date(2024, 1, 5), "F", "601", "AC", "", dec!(10)))
        .unwrap()
        .id;

    ClosingService::request_close(&mut store, "2024", key(2024, 1)).unwrap();
    ClosingService::request_close(&mut store, "2024", key(2024, 1)).unwrap();
    assert_eq!(status(&store, key(2024, 1)), Some(PeriodStatus::PendingClose));

    store.cancel_entry(id).unwrap();
    close(&mut store, key(2024, 1)).unwrap();

    assert_eq!(
        ClosingService::request_close(&mut store, "2024", key(2024, 1)).unwrap_err(),
        LedgerError::AlreadyClosed {
            year: "2024".into(),
            period: key(2024, 1)
        }
    );
}

#[test]
fn test_final_period_closes_exercise() {
    let mut store = setup();
    purchase(&mut store, date(2024, 1, 5), dec!(1000));
    sale(&mut store, date(2024, 1, 10), dec!(1500));
    sale(&mut store, date(2024, 3, 2), dec!(300));

    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
    let record = close(&mut store, key(2024, 3)).unwrap();

    assert!(record.exercise_closed);
    assert_eq!(record.net_result, Some(dec!(800)));
    // 601, 701 and the result line
    assert_eq!(record.closing_entries.len(), 3);

    let exercise = store.calendar().exercise("2024").unwrap();
    assert!(exercise.closed);
    assert!(exercise.closed_at.is_some());

    assert_eq!(store.account_balance("601", None).unwrap(), Decimal::ZERO);
    assert_eq!(store.account_balance("701", None).unwrap(), Decimal::ZERO);
    assert_eq!(store.account_balance("120000", None).unwrap(), dec!(800));
    assert_eq!(
        store.journals().resolve("CLO").unwrap().journal_type,
        JournalType::Closing
    );

    for id in &record.closing_entries {
        let entry = store.entry(*id).unwrap();
        assert!(entry.is_validated());
        assert_eq!(entry.date, date(2024, 3, 31));
        assert_eq!(entry.journal_code, "CLO");
    }

    let trial = ReportService::trial_balance(&store, None);
    assert!(trial.totals.is_balanced);

    let income = ReportService::income_statement(&store, exercise.range());
    assert_eq!(income.net_result, dec!(800));

    let err = store
        .create_entry(NewEntry::debit(date(2024, 3, 31), "X", "601", "AC", "", dec!(1)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClosedPeriod);
}

#[test]
fn test_loss_debits_result_account() {
    let mut store = setup();
    purchase(&mut store, date(2024, 3, 5), dec!(400));
    sale(&mut store, date(2024, 3, 6), dec!(100));

    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
    let record = close(&mut store, key(2024, 3)).unwrap();

    assert_eq!(record.net_result, Some(dec!(-300)));
    assert_eq!(store.account_balance("120000", None).unwrap(), dec!(-300));
}

#[test]
fn test_final_close_without_activity_posts_nothing() {
    let mut store = setup();
    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
    let record = close(&mut store, key(2024, 3)).unwrap();

    assert!(record.exercise_closed);
    assert!(record.closing_entries.is_empty());
    assert_eq!(store.entry_count(), 0);
    assert!(store.journals().resolve("CLO").is_err());
}

#[test]
fn test_inactive_revenue_account_still_zeroed() {
    let mut store = setup();
    sale(&mut store, date(2024, 1, 10), dec!(50));
    store.deactivate_account("701").unwrap();

    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
    close(&mut store, key(2024, 3)).unwrap();

    assert_eq!(store.account_balance("701", None).unwrap(), Decimal::ZERO);
}

#[test]
fn test_zero_tolerance_requires_exact_balance() {
    let config = LedgerConfig {
        balance_tolerance: Decimal::ZERO,
        ..LedgerConfig::default()
    };
    let mut store = setup();
    purchase(&mut store, date(2024, 1, 5), dec!(100));
    close_with(&mut store, &config, key(2024, 1)).unwrap();

    let id = store
        .create_entry(NewEntry::debit(date(2024, 2, 5), "F", "601", "AC", "", dec!(0.001)))
        .unwrap()
        .id;
    store.validate_entry(id, ActorId::new()).unwrap();
    let err = close_with(&mut store, &config, key(2024, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnbalancedBooks);
}

#[test]
fn test_existing_closing_journal_must_be_closing_type() {
    let mut store = setup();
    store
        .create_journal("CLO", "Other entries", JournalType::Miscellaneous)
        .unwrap();
    sale(&mut store, date(2024, 1, 10), dec!(1500));
    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();

    assert_eq!(
        close(&mut store, key(2024, 3)).unwrap_err(),
        LedgerError::ClosingJournalMismatch {
            code: "CLO".into(),
            found: JournalType::Miscellaneous,
        }
    );
    assert_eq!(status(&store, key(2024, 3)), Some(PeriodStatus::Open));
    assert_eq!(store.account_balance("701", None).unwrap(), dec!(1500));
    let income = ReportService::income_statement(
        &store,
        store.calendar().exercise("2024").unwrap().range(),
    );
    assert_eq!(income.net_result, dec!(1500));
}

#[test]
fn test_existing_result_account_must_be_liability() {
    let mut store = setup();
    store
        .create_account(NewAccount::new("120000", "Misfiled result", AccountType::Revenue))
        .unwrap();
    sale(&mut store, date(2024, 1, 10), dec!(1500));
    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();

    let err = close(&mut store, key(2024, 3)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::ResultAccountMismatch {
            code: "120000".into(),
            found: AccountType::Revenue,
        }
    );
    assert_eq!(err.kind(), ErrorKind::ClosingTargetMismatch);
    assert!(!store.calendar().exercise("2024").unwrap().closed);
}

#[test]
fn test_existing_closing_targets_are_reused() {
    let mut store = setup();
    store
        .create_journal("CLO", "Year end", JournalType::Closing)
        .unwrap();
    store
        .create_account(NewAccount::new("120000", "Result", AccountType::Liability))
        .unwrap();
    sale(&mut store, date(2024, 1, 10), dec!(200));

    close(&mut store, key(2024, 1)).unwrap();
    close(&mut store, key(2024, 2)).unwrap();
    close(&mut store, key(2024, 3)).unwrap();

    assert_eq!(store.journals().resolve("CLO").unwrap().label, "Year end");
    assert_eq!(store.account_balance("120000", None).unwrap(), dec!(200));
}
