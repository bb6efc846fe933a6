//! Exercise (fiscal year) lifecycle.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use grandlivre_shared::ActorId;
use serde::{Deserialize, Serialize};

use super::period::{DateRange, PeriodKey};
use crate::error::LedgerError;

/// Closure status of one period of an exercise.
///
/// Valid transitions are:
/// - Open → PendingClose (close requested)
/// - Open → Closed
/// - PendingClose → Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Entries can be created and validated.
    Open,
    /// Close requested: no new entries, remaining drafts may still be validated or cancelled.
    PendingClose,
    /// Frozen.
    Closed,
}

impl PeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::PendingClose => "pending_close",
            Self::Closed => "closed",
        }
    }

    /// Returns true if new entries may be created.
    #[must_use]
    pub fn accepts_new_entries(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if existing drafts may still be validated or cancelled.
    #[must_use]
    pub fn accepts_validation(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Four-digit year label (e.g. "2024").
    pub year: String,
    /// First day of the exercise.
    pub start: NaiveDate,
    /// Last day of the exercise.
    pub end: NaiveDate,
    /// Set once the final period closes. Terminal.
    pub closed: bool,
    /// When the exercise was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the exercise.
    pub closed_by: Option<ActorId>,
    /// Closure status of every month the exercise spans.
    pub periods: BTreeMap<PeriodKey, PeriodStatus>,
}

impl Exercise {
    /// Creates an open exercise and lays out its monthly periods.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExerciseYear` if the label is not four digits and
    /// `InvalidRange` if `end <= start`.
    pub fn new(year: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidExerciseYear(year.to_string()));
        }
        if end <= start {
            return Err(LedgerError::InvalidRange { start, end });
        }

        let mut periods = BTreeMap::new();
        let last = PeriodKey::from_date(end);
        let mut key = PeriodKey::from_date(start);
        while key <= last {
            periods.insert(key, PeriodStatus::Open);
            key = key.next();
        }

        Ok(Self {
            year: year.to_string(),
            start,
            end,
            closed: false,
            closed_at: None,
            closed_by: None,
            periods,
        })
    }

    /// Returns true if `date` falls inside the exercise.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The exercise as an inclusive date range.
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }

    /// Status of a period, if it belongs to the exercise.
    #[must_use]
    pub fn period_status(&self, period: PeriodKey) -> Option<PeriodStatus> {
        self.periods.get(&period).copied()
    }

    /// Returns the status of `period` or `PeriodNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` if the period is outside the exercise.
    pub fn require_period(&self, period: PeriodKey) -> Result<PeriodStatus, LedgerError> {
        self.period_status(period)
            .ok_or_else(|| LedgerError::PeriodNotFound {
                year: self.year.clone(),
                period,
            })
    }

    /// Returns true if a new entry dated `date` may be created.
    #[must_use]
    pub fn accepts_new_entries(&self, date: NaiveDate) -> bool {
        !self.closed
            && self.contains(date)
            && self
                .period_status(PeriodKey::from_date(date))
                .is_some_and(|s| s.accepts_new_entries())
    }

    /// Returns true if a draft dated `date` may be validated or cancelled.
    #[must_use]
    pub fn accepts_validation(&self, date: NaiveDate) -> bool {
        !self.closed
            && self.contains(date)
            && self
                .period_status(PeriodKey::from_date(date))
                .is_some_and(|s| s.accepts_validation())
    }

    /// The last period of the exercise.
    #[must_use]
    pub fn final_period(&self) -> Option<PeriodKey> {
        self.periods.keys().next_back().copied()
    }

    /// First period before `period` that is not closed yet.
    #[must_use]
    pub fn first_unclosed_before(&self, period: PeriodKey) -> Option<PeriodKey> {
        self.periods
            .range(..period)
            .find(|(_, status)| **status != PeriodStatus::Closed)
            .map(|(key, _)| *key)
    }

    /// Periods not closed yet, in chronological order.
    #[must_use]
    pub fn unclosed_periods(&self) -> Vec<PeriodKey> {
        self.periods
            .iter()
            .filter(|(_, status)| **status != PeriodStatus::Closed)
            .map(|(key, _)| *key)
            .collect()
    }

    /// The part of `period` that lies inside the exercise.
    #[must_use]
    pub fn period_range(&self, period: PeriodKey) -> DateRange {
        DateRange {
            start: period.first_day().max(self.start),
            end: period.last_day().min(self.end),
        }
    }
}
