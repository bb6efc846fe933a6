//! Exercise registry.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::exercise::Exercise;
use super::period::{PeriodKey, date_ranges_overlap};
use crate::error::LedgerError;

/// All exercises known to the ledger, keyed by year label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiscalCalendar {
    exercises: BTreeMap<String, Exercise>,
}

impl FiscalCalendar {
    /// Registers a new open exercise.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidExerciseYear` / `InvalidRange` for malformed input
    /// - `DuplicateExercise` if the year label exists
    /// - `OverlappingExercise` if the range intersects an existing exercise
    pub fn create_exercise(
        &mut self,
        year: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&Exercise, LedgerError> {
        let exercise = Exercise::new(year, start, end)?;

        if self.exercises.contains_key(year) {
            return Err(LedgerError::DuplicateExercise(year.to_string()));
        }

        if let Some(existing) = self
            .exercises
            .values()
            .find(|e| date_ranges_overlap(e.start, e.end, start, end))
        {
            return Err(LedgerError::OverlappingExercise {
                year: year.to_string(),
                existing: existing.year.clone(),
            });
        }

        Ok(self.exercises.entry(year.to_string()).or_insert(exercise))
    }

    /// Looks up an exercise by year label.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotFound` if the year is unknown.
    pub fn exercise(&self, year: &str) -> Result<&Exercise, LedgerError> {
        self.exercises
            .get(year)
            .ok_or_else(|| LedgerError::ExerciseNotFound(year.to_string()))
    }

    pub(crate) fn exercise_mut(&mut self, year: &str) -> Result<&mut Exercise, LedgerError> {
        self.exercises
            .get_mut(year)
            .ok_or_else(|| LedgerError::ExerciseNotFound(year.to_string()))
    }

    /// The exercise containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `NoExercise` if no exercise covers the date.
    pub fn exercise_for(&self, date: NaiveDate) -> Result<&Exercise, LedgerError> {
        self.exercises
            .values()
            .find(|e| e.contains(date))
            .ok_or(LedgerError::NoExercise(date))
    }

    /// Returns false if no exercise covers the date or the covering
    /// exercise/period does not accept new entries.
    #[must_use]
    pub fn is_open(&self, date: NaiveDate) -> bool {
        self.exercise_for(date)
            .is_ok_and(|e| e.accepts_new_entries(date))
    }

    /// Ensures a new entry dated `date` may be created.
    ///
    /// # Errors
    ///
    /// Returns `NoExercise` or `ClosedPeriod`.
    pub fn ensure_accepts_new_entries(&self, date: NaiveDate) -> Result<&Exercise, LedgerError> {
        let exercise = self.exercise_for(date)?;
        if !exercise.accepts_new_entries(date) {
            return Err(LedgerError::ClosedPeriod {
                date,
                period: PeriodKey::from_date(date),
            });
        }
        Ok(exercise)
    }

    /// Ensures a draft dated `date` may still be validated or cancelled.
    ///
    /// # Errors
    ///
    /// Returns `NoExercise` or `ClosedPeriod`.
    pub fn ensure_accepts_validation(&self, date: NaiveDate) -> Result<&Exercise, LedgerError> {
        let exercise = self.exercise_for(date)?;
        if !exercise.accepts_validation(date) {
            return Err(LedgerError::ClosedPeriod {
                date,
                period: PeriodKey::from_date(date),
            });
        }
        Ok(exercise)
    }
}
