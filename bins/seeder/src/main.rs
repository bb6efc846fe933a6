//! Demo ledger seeder for Grand Livre.
//!
//! Seeds a chart of accounts, journals and the 2024 exercise, posts a month of
//! activity, closes January and prints the reports as JSON.
//!
//! Usage: cargo run --bin seeder [-- <store.json>]
//!
//! When a path is given the resulting store is written there as JSON.

use anyhow::Context;
use chrono::NaiveDate;
use grandlivre_core::Ledger;
use grandlivre_core::chart::{AccountType, NewAccount};
use grandlivre_core::closing::AlwaysReconciled;
use grandlivre_core::fiscal::{DateRange, PeriodKey};
use grandlivre_core::journal::JournalType;
use grandlivre_core::ledger::NewEntry;
use grandlivre_shared::{ActorId, AppConfig, LoggingConfig};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let ledger = Ledger::new(config.ledger.clone());
    let actor = ActorId::new();

    seed_chart(&ledger)?;
    seed_journals(&ledger)?;
    ledger.create_exercise("2024", date(2024, 1, 1)?, date(2024, 12, 31)?)?;
    post_january(&ledger, actor)?;

    let january = PeriodKey::new(2024, 1)?;
    let closing = ledger.close_period("2024", january, actor, &AlwaysReconciled)?;
    info!(period = %closing.period, "January closed");

    let reports = serde_json::json!({
        "trial_balance": ledger.trial_balance(None)?,
        "general_ledger": ledger.general_ledger(None, Some(DateRange::month(january)))?,
        "balance_sheet": ledger.balance_sheet(january.last_day())?,
        "income_statement": ledger.income_statement(DateRange::month(january))?,
        "closing": closing,
    });
    println!("{}", serde_json::to_string_pretty(&reports)?);

    if let Some(path) = std::env::args().nth(1) {
        let store = serde_json::to_string_pretty(&*ledger.snapshot()?)?;
        std::fs::write(&path, store).with_context(|| format!("Failed to write {path}"))?;
        info!(%path, "Store written");
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("Invalid date {year}-{month}-{day}"))
}

fn seed_chart(ledger: &Ledger) -> anyhow::Result<()> {
    let roots = [
        ("4", "Third-party accounts", AccountType::Liability),
        ("5", "Financial accounts", AccountType::Asset),
        ("6", "Expenses", AccountType::Expense),
        ("7", "Revenue", AccountType::Revenue),
    ];
    for (code, label, account_type) in roots {
        ledger.create_account(NewAccount::new(code, label, account_type))?;
    }

    let leaves = [
        ("401000", "Suppliers", AccountType::Liability, "4"),
        ("411000", "Customers", AccountType::Asset, "4"),
        ("512000", "Bank", AccountType::Asset, "5"),
        ("530000", "Cash", AccountType::Asset, "5"),
        ("601000", "Raw material purchases", AccountType::Expense, "6"),
        ("641000", "Salaries", AccountType::Expense, "6"),
        ("701000", "Product sales", AccountType::Revenue, "7"),
    ];
    for (code, label, account_type, parent) in leaves {
        ledger.create_account(NewAccount::new(code, label, account_type).with_parent(parent))?;
    }
    Ok(())
}

fn seed_journals(ledger: &Ledger) -> anyhow::Result<()> {
    let journals = [
        ("AC", "Purchases", JournalType::Purchases),
        ("VT", "Sales", JournalType::Sales),
        ("BQ", "Bank", JournalType::Bank),
        ("CA", "Cash", JournalType::Cash),
        ("OD", "Miscellaneous", JournalType::Miscellaneous),
    ];
    for (code, label, journal_type) in journals {
        ledger.create_journal(code, label, journal_type)?;
    }
    Ok(())
}

fn post_january(ledger: &Ledger, actor: ActorId) -> anyhow::Result<()> {
    let amount = |units: i64| Decimal::new(units, 0);

    let day = date(2024, 1, 5)?;
    ledger.post_balanced(
        vec![
            NewEntry::debit(day, "F-0001", "601000", "AC", "Flour", amount(1000))
                .with_reference("stock_movement", "SM-0001"),
            NewEntry::credit(day, "F-0001", "401000", "AC", "Mill supplier", amount(1000)),
        ],
        actor,
    )?;

    let day = date(2024, 1, 10)?;
    ledger.post_balanced(
        vec![
            NewEntry::debit(day, "V-0001", "411000", "VT", "Bakery customer", amount(1500)),
            NewEntry::credit(day, "V-0001", "701000", "VT", "Bread", amount(1500)),
        ],
        actor,
    )?;

    let day = date(2024, 1, 25)?;
    ledger.post_balanced(
        vec![
            NewEntry::debit(day, "R-0001", "512000", "BQ", "Customer payment", amount(1500)),
            NewEntry::credit(day, "R-0001", "411000", "BQ", "Customer payment", amount(1500)),
        ],
        actor,
    )?;

    let day = date(2024, 1, 31)?;
    ledger.post_balanced(
        vec![
            NewEntry::debit(day, "S-0001", "641000", "OD", "January payroll", amount(300)),
            NewEntry::credit(day, "S-0001", "512000", "OD", "January payroll", amount(300)),
        ],
        actor,
    )?;
    Ok(())
}
