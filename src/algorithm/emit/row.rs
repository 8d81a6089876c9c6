//! Model-ready survival rows

use serde::{Deserialize, Serialize};

use crate::models::BiographicalRecord;

/// One row handed to an external survival routine
///
/// Only usable observations become rows: `duration` is positive and `event`
/// is 1 (observed) or 0 (censored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalRow {
    pub subject_id: String,
    /// `lifetime`, `career`, `retirement_age` or `post_induction`
    pub kind: String,
    /// Years
    pub duration: f64,
    /// 1 = observed, 0 = censored
    pub event: u8,
    /// 1 = inductee / treatment subject, 0 = other / control
    pub group: u8,
    /// Treatment subject id of the matched set, for matched rows
    pub matched_set: Option<String>,
    pub birth_year: Option<i32>,
    pub height_inches: Option<u32>,
    pub weight_pounds: Option<u32>,
    pub bmi: Option<f64>,
    pub seasons: Option<u32>,
    pub bats: String,
    pub throws: String,
}

impl SurvivalRow {
    /// A row carrying the record's covariates
    #[must_use]
    pub fn new(record: &BiographicalRecord, kind: &str, duration: f64, event: u8, group: u8) -> Self {
        Self {
            subject_id: record.subject_id.clone(),
            kind: kind.to_string(),
            duration,
            event,
            group,
            matched_set: None,
            birth_year: record.birth_year(),
            height_inches: record.height_inches,
            weight_pounds: record.weight_pounds,
            bmi: record.body_mass_index(),
            seasons: record.seasons(),
            bats: record.bats.to_string(),
            throws: record.throws.to_string(),
        }
    }
}
