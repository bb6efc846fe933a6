//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bookkeeping engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bookkeeping engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Largest debit/credit gap still treated as equilibrated when closing a period.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Code of the journal that receives generated closing entries.
    #[serde(default = "default_closing_journal_code")]
    pub closing_journal_code: String,
    /// Label used when the closing journal has to be created.
    #[serde(default = "default_closing_journal_label")]
    pub closing_journal_label: String,
    /// Account receiving the net result when an exercise closes.
    #[serde(default = "default_result_account_code")]
    pub result_account_code: String,
    /// Label used when the result account has to be created.
    #[serde(default = "default_result_account_label")]
    pub result_account_label: String,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_closing_journal_code() -> String {
    "CLO".to_string()
}

fn default_closing_journal_label() -> String {
    "Closing entries".to_string()
}

fn default_result_account_code() -> String {
    "120000".to_string()
}

fn default_result_account_label() -> String {
    "Result of the exercise".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            closing_journal_code: default_closing_journal_code(),
            closing_journal_label: default_closing_journal_label(),
            result_account_code: default_result_account_code(),
            result_account_label: default_result_account_label(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "grandlivre=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GRANDLIVRE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
