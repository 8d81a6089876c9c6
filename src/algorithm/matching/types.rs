//! Type definitions for the matching algorithm

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{LifeStatus, ResolvedDate};

/// A Hall of Fame inductee who was confirmed alive at induction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentSubject {
    pub subject_id: String,
    /// Matching key
    pub birth_year: i32,
    /// Induction year
    pub index_year: i32,
    /// Induction year resolved with the year-only rule
    pub index_date: NaiveDate,
    /// Position of the subject in the record slice
    #[serde(skip)]
    pub record_index: usize,
}

impl TreatmentSubject {
    /// Create a treatment subject; the index date is June 30 of the index year
    #[must_use]
    pub fn new(subject_id: &str, birth_year: i32, index_year: i32, record_index: usize) -> Option<Self> {
        let index_date = ResolvedDate::from_parts(index_year, None, None)?.date;
        Some(Self {
            subject_id: subject_id.to_string(),
            birth_year,
            index_year,
            index_date,
            record_index,
        })
    }
}

/// One (treatment, control) row of the pair view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub treatment_id: String,
    pub control_id: String,
    /// Shared birth year
    pub birth_year: i32,
    /// Index year of the treatment subject
    pub index_year: i32,
    /// Death year of the control, when known
    pub control_death_year: Option<i32>,
}

/// One distinct control of the control view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub control_id: String,
    pub birth_year: i32,
    /// Number of treatment subjects this control was matched to
    pub match_count: usize,
    /// Earliest index year among its matches
    pub first_index_year: i32,
    /// Latest index year among its matches
    pub last_index_year: i32,
}

/// Why an inductee is not a treatment subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentExclusion {
    /// Inducted, but the induction year is unknown
    NoIndexYear,
    /// No birth year to match on
    NoBirthYear,
    /// Died before (or, under the strict boundary, in) the induction year
    Posthumous,
    /// Survival to induction cannot be shown
    Indeterminate,
}

impl fmt::Display for TreatmentExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoIndexYear => "no induction year",
            Self::NoBirthYear => "no birth year",
            Self::Posthumous => "inducted posthumously",
            Self::Indeterminate => "survival to induction unknown",
        };
        f.write_str(label)
    }
}

/// Counts describing one matching run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingStats {
    /// Inductees considered
    pub inductees: usize,
    /// Inductees that became treatment subjects
    pub treatments: usize,
    /// Inductees left out of the treatment set, by reason
    pub treatment_exclusions: BTreeMap<TreatmentExclusion, usize>,
    /// Treatment subjects with at least one control
    pub matched_treatments: usize,
    /// Rows in the pair view
    pub pairs: usize,
    /// Rows in the control view
    pub distinct_controls: usize,
    /// Same-birth-year candidates with indeterminate life status
    pub indeterminate_candidates: usize,
    /// (treatment, candidate) combinations rejected because the candidate
    /// was not alive at the index year
    pub rejected_not_alive: usize,
    /// Eligible pairs dropped by the per-treatment cap
    pub dropped_by_cap: usize,
}

/// The life status of a candidate, as seen by the matcher
pub(crate) fn death_year(status: LifeStatus) -> Option<i32> {
    match status {
        LifeStatus::Deceased { year } => Some(year),
        LifeStatus::Alive | LifeStatus::Indeterminate => None,
    }
}
