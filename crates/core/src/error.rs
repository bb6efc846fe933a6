//! Ledger error types.
//!
//! Every failure the engine can report is a business-rule violation returned
//! to the immediate caller. Each variant maps to an [`ErrorKind`] so callers
//! can pick the corrective action without matching on individual variants.

use chrono::NaiveDate;
use grandlivre_shared::EntryId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::chart::AccountType;
use crate::fiscal::PeriodKey;
use crate::journal::JournalType;

/// Result type alias using `LedgerError`.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Coarse classification of ledger errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown account, journal, entry, exercise or period.
    NotFound,
    /// Code or year label already taken.
    DuplicateCode,
    /// Parent assignment would create a loop in the account tree.
    CyclicHierarchy,
    /// Exercise date range intersects an existing exercise.
    OverlappingExercise,
    /// Date range with end not after start.
    InvalidRange,
    /// Debit/credit pair is not exactly one strictly positive side.
    InvalidAmount,
    /// Date not covered by an open exercise/period.
    ClosedPeriod,
    /// Entry already validated.
    AlreadyValidated,
    /// Entry already cancelled.
    AlreadyCancelled,
    /// Entry is not validated yet.
    NotValidated,
    /// Journal still has entries in an open exercise.
    JournalInUse,
    /// Draft entries remain in the period being closed.
    PendingEntries,
    /// Debits and credits do not match.
    UnbalancedBooks,
    /// Period or exercise already closed.
    AlreadyClosed,
    /// Malformed account code, journal code, year label or period key.
    InvalidCode,
    /// Account or journal is deactivated.
    Inactive,
    /// Account type cannot change once postings exist.
    AccountTypeLocked,
    /// Entry already has a reversing entry.
    AlreadyReversed,
    /// Earlier periods of the exercise are still open.
    EarlierPeriodsOpen,
    /// Required reconciliations are missing.
    Unreconciled,
    /// Totals exceed the decimal range.
    AmountOverflow,
    /// Closing journal or result account exists with the wrong type.
    ClosingTargetMismatch,
    /// Engine invariant broken (poisoned lock).
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(String),

    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Exercise not found.
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(String),

    /// Period key not part of the exercise.
    #[error("Period {period} does not belong to exercise {year}")]
    PeriodNotFound {
        /// Exercise year label.
        year: String,
        /// Requested period.
        period: PeriodKey,
    },

    /// Parent account does not exist.
    #[error("Unknown parent account {parent} for account {code}")]
    UnknownParent {
        /// Account being created or moved.
        code: String,
        /// Missing parent code.
        parent: String,
    },

    // ========== Chart & Registry Errors ==========
    /// Account code already exists.
    #[error("Account code already exists: {0}")]
    DuplicateAccount(String),

    /// Journal code already exists.
    #[error("Journal code already exists: {0}")]
    DuplicateJournal(String),

    /// Exercise year already exists.
    #[error("Exercise already exists: {0}")]
    DuplicateExercise(String),

    /// Account code is not a numeric string.
    #[error("Invalid account code: {0:?}")]
    InvalidAccountCode(String),

    /// Journal code is empty or contains whitespace.
    #[error("Invalid journal code: {0:?}")]
    InvalidJournalCode(String),

    /// Exercise year label is not a 4-digit string.
    #[error("Invalid exercise year: {0:?}")]
    InvalidExerciseYear(String),

    /// Period key is not of the form YYYY-MM.
    #[error("Invalid period key: {0:?}")]
    InvalidPeriodKey(String),

    /// Parent assignment would make the account its own ancestor.
    #[error("Setting parent {parent} on account {code} would create a cycle")]
    CyclicHierarchy {
        /// Account being moved.
        code: String,
        /// Proposed parent.
        parent: String,
    },

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// Journal is inactive and cannot receive entries.
    #[error("Journal {0} is inactive")]
    JournalInactive(String),

    /// Account type cannot be changed because it has postings.
    #[error("Cannot change account type for account {0} because it has postings")]
    AccountTypeLocked(String),

    /// Journal still has entries in an open exercise.
    #[error("Journal {code} has {entries} entries in an open exercise")]
    JournalInUse {
        /// Journal code.
        code: String,
        /// Number of live entries in open exercises.
        entries: usize,
    },

    // ========== Fiscal Period Errors ==========
    /// Exercise range intersects an existing exercise.
    #[error("Exercise {year} overlaps existing exercise {existing}")]
    OverlappingExercise {
        /// Year being created.
        year: String,
        /// Existing exercise it collides with.
        existing: String,
    },

    /// End date is not after start date.
    #[error("Invalid date range: start {start}, end {end}")]
    InvalidRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// No exercise covers the date.
    #[error("No exercise covers date {0}")]
    NoExercise(NaiveDate),

    /// The exercise or period covering the date does not accept the operation.
    #[error("Period {period} is closed for date {date}")]
    ClosedPeriod {
        /// Entry date.
        date: NaiveDate,
        /// Period key of the date.
        period: PeriodKey,
    },

    // ========== Entry Errors ==========
    /// Debit/credit pair is not exactly one strictly positive side.
    #[error("Entry must have exactly one strictly positive side. Debit: {debit}, Credit: {credit}")]
    InvalidAmount {
        /// Requested debit.
        debit: Decimal,
        /// Requested credit.
        credit: Decimal,
    },

    /// Totals would leave the representable decimal range.
    #[error("Amount overflow while totalling {scope}")]
    AmountOverflow {
        /// What was being totalled (an account, a batch or the ledger).
        scope: String,
    },

    /// Entry is already validated.
    #[error("Journal entry {0} is already validated")]
    AlreadyValidated(EntryId),

    /// Entry is already cancelled.
    #[error("Journal entry {0} is already cancelled")]
    AlreadyCancelled(EntryId),

    /// Entry is not validated.
    #[error("Journal entry {0} is not validated")]
    NotValidated(EntryId),

    /// Entry already has a reversing entry.
    #[error("Journal entry {entry} was already reversed by entry {reversal}")]
    AlreadyReversed {
        /// Original entry.
        entry: EntryId,
        /// Existing reversing entry.
        reversal: EntryId,
    },

    // ========== Closing Errors ==========
    /// Draft entries remain in the period.
    #[error("Period {period} still has {count} draft entries")]
    PendingEntries {
        /// Period being closed.
        period: PeriodKey,
        /// Number of draft entries.
        count: usize,
    },

    /// Debits and credits do not match.
    #[error("Books are unbalanced for {scope}. Debit: {debit}, Credit: {credit}, Delta: {delta}")]
    UnbalancedBooks {
        /// What was checked (a period key or a batch).
        scope: String,
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
        /// `debit - credit`.
        delta: Decimal,
    },

    /// Period is already closed.
    #[error("Period {period} of exercise {year} is already closed")]
    AlreadyClosed {
        /// Exercise year label.
        year: String,
        /// Period key.
        period: PeriodKey,
    },

    /// Earlier periods must be closed first.
    #[error("Cannot close period {period}: earlier period {earlier} is still open")]
    EarlierPeriodsOpen {
        /// Period being closed.
        period: PeriodKey,
        /// First earlier period still open.
        earlier: PeriodKey,
    },

    /// Reconciliation capability refused the close.
    #[error("Period {period} has unreconciled accounts: {}", accounts.join(", "))]
    Unreconciled {
        /// Period being closed.
        period: PeriodKey,
        /// Accounts not tied out.
        accounts: Vec<String>,
    },

    /// Configured closing journal exists with another journal type.
    #[error("Journal {code} is a {found} journal and cannot receive closing entries")]
    ClosingJournalMismatch {
        /// Configured closing journal code.
        code: String,
        /// Type of the existing journal.
        found: JournalType,
    },

    /// Configured result account exists with a type other than LIABILITY.
    #[error("Result account {code} must be a liability, found {found}")]
    ResultAccountMismatch {
        /// Configured result account code.
        code: String,
        /// Type of the existing account.
        found: AccountType,
    },

    // ========== Internal Errors ==========
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_)
            | Self::JournalNotFound(_)
            | Self::EntryNotFound(_)
            | Self::ExerciseNotFound(_)
            | Self::PeriodNotFound { .. }
            | Self::UnknownParent { .. } => ErrorKind::NotFound,
            Self::DuplicateAccount(_) | Self::DuplicateJournal(_) | Self::DuplicateExercise(_) => {
                ErrorKind::DuplicateCode
            }
            Self::InvalidAccountCode(_)
            | Self::InvalidJournalCode(_)
            | Self::InvalidExerciseYear(_)
            | Self::InvalidPeriodKey(_) => ErrorKind::InvalidCode,
            Self::CyclicHierarchy { .. } => ErrorKind::CyclicHierarchy,
            Self::AccountInactive(_) | Self::JournalInactive(_) => ErrorKind::Inactive,
            Self::AccountTypeLocked(_) => ErrorKind::AccountTypeLocked,
            Self::JournalInUse { .. } => ErrorKind::JournalInUse,
            Self::OverlappingExercise { .. } => ErrorKind::OverlappingExercise,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::NoExercise(_) | Self::ClosedPeriod { .. } => ErrorKind::ClosedPeriod,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::AmountOverflow { .. } => ErrorKind::AmountOverflow,
            Self::AlreadyValidated(_) => ErrorKind::AlreadyValidated,
            Self::AlreadyCancelled(_) => ErrorKind::AlreadyCancelled,
            Self::NotValidated(_) => ErrorKind::NotValidated,
            Self::AlreadyReversed { .. } => ErrorKind::AlreadyReversed,
            Self::PendingEntries { .. } => ErrorKind::PendingEntries,
            Self::UnbalancedBooks { .. } => ErrorKind::UnbalancedBooks,
            Self::AlreadyClosed { .. } => ErrorKind::AlreadyClosed,
            Self::EarlierPeriodsOpen { .. } => ErrorKind::EarlierPeriodsOpen,
            Self::Unreconciled { .. } => ErrorKind::Unreconciled,
            Self::ClosingJournalMismatch { .. } | Self::ResultAccountMismatch { .. } => {
                ErrorKind::ClosingTargetMismatch
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ExerciseNotFound(_) => "EXERCISE_NOT_FOUND",
            Self::PeriodNotFound { .. } => "PERIOD_NOT_FOUND",
            Self::UnknownParent { .. } => "UNKNOWN_PARENT",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::DuplicateJournal(_) => "DUPLICATE_JOURNAL",
            Self::DuplicateExercise(_) => "DUPLICATE_EXERCISE",
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::InvalidJournalCode(_) => "INVALID_JOURNAL_CODE",
            Self::InvalidExerciseYear(_) => "INVALID_EXERCISE_YEAR",
            Self::InvalidPeriodKey(_) => "INVALID_PERIOD_KEY",
            Self::CyclicHierarchy { .. } => "CYCLIC_HIERARCHY",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::JournalInactive(_) => "JOURNAL_INACTIVE",
            Self::AccountTypeLocked(_) => "ACCOUNT_TYPE_LOCKED",
            Self::JournalInUse { .. } => "JOURNAL_IN_USE",
            Self::OverlappingExercise { .. } => "OVERLAPPING_EXERCISE",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::NoExercise(_) => "NO_EXERCISE",
            Self::ClosedPeriod { .. } => "CLOSED_PERIOD",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            Self::AlreadyValidated(_) => "ALREADY_VALIDATED",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::NotValidated(_) => "NOT_VALIDATED",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::PendingEntries { .. } => "PENDING_ENTRIES",
            Self::UnbalancedBooks { .. } => "UNBALANCED_BOOKS",
            Self::AlreadyClosed { .. } => "ALREADY_CLOSED",
            Self::EarlierPeriodsOpen { .. } => "EARLIER_PERIODS_OPEN",
            Self::Unreconciled { .. } => "UNRECONCILED",
            Self::ClosingJournalMismatch { .. } => "CLOSING_JOURNAL_MISMATCH",
            Self::ResultAccountMismatch { .. } => "RESULT_ACCOUNT_MISMATCH",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            // 400 Bad Request - malformed input
            ErrorKind::InvalidRange | ErrorKind::InvalidAmount | ErrorKind::InvalidCode => 400,

            // 404 Not Found
            ErrorKind::NotFound => 404,

            // 409 Conflict - state of the ledger forbids the change
            ErrorKind::DuplicateCode
            | ErrorKind::OverlappingExercise
            | ErrorKind::AlreadyValidated
            | ErrorKind::AlreadyCancelled
            | ErrorKind::AlreadyReversed
            | ErrorKind::AlreadyClosed
            | ErrorKind::JournalInUse
            | ErrorKind::AccountTypeLocked
            | ErrorKind::CyclicHierarchy
            | ErrorKind::ClosingTargetMismatch => 409,

            // 422 Unprocessable - business rule refused the operation
            ErrorKind::ClosedPeriod
            | ErrorKind::NotValidated
            | ErrorKind::Inactive
            | ErrorKind::PendingEntries
            | ErrorKind::UnbalancedBooks
            | ErrorKind::EarlierPeriodsOpen
            | ErrorKind::Unreconciled
            | ErrorKind::AmountOverflow => 422,

            // 500 Internal Server Error
            ErrorKind::Internal => 500,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Business-rule violations never are; the caller has to change its input.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
