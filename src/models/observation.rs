//! Survival observations derived from biographical records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::types::{DurationKind, EventStatus, HallOfFame};

/// Why an observation has no usable duration or event status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// A required endpoint date is missing
    MissingDate,
    /// Age at the as-of date exceeds the sanity ceiling with no death date
    ExceedsCeiling,
    /// Death is implied by a death-context field but is undated
    UndatedDeath,
    /// The end date precedes the start date
    NegativeInterval,
    /// An endpoint lies after the as-of date
    AfterAsOf,
}

impl UnknownReason {
    /// Whether this reason is a sanity-bound violation rather than missing data
    #[must_use]
    pub const fn is_sanity_violation(self) -> bool {
        matches!(
            self,
            Self::ExceedsCeiling | Self::NegativeInterval | Self::AfterAsOf
        )
    }
}

/// One survival observation for one subject and one duration kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalObservation {
    /// Subject the observation belongs to
    pub subject_id: String,
    /// Which duration this is
    pub kind: DurationKind,
    /// Duration in years; `None` when it cannot be computed
    pub duration: Option<f64>,
    /// Whether the terminating event was seen
    pub status: EventStatus,
    /// Grouping variable under study
    pub strata: HallOfFame,
    /// Snapshot date used for censoring
    pub as_of_date: NaiveDate,
    /// Set when the status is unknown
    pub unknown_reason: Option<UnknownReason>,
}

impl SurvivalObservation {
    /// A fully known observation
    #[must_use]
    pub fn known(
        subject_id: &str,
        kind: DurationKind,
        duration: f64,
        status: EventStatus,
        strata: HallOfFame,
        as_of_date: NaiveDate,
    ) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            kind,
            duration: Some(duration),
            status,
            strata,
            as_of_date,
            unknown_reason: None,
        }
    }

    /// An observation that must be excluded from modelling
    #[must_use]
    pub fn unknown(
        subject_id: &str,
        kind: DurationKind,
        reason: UnknownReason,
        strata: HallOfFame,
        as_of_date: NaiveDate,
    ) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            kind,
            duration: None,
            status: EventStatus::Unknown,
            strata,
            as_of_date,
            unknown_reason: Some(reason),
        }
    }

    /// Whether the observation can be handed to a survival model
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.status != EventStatus::Unknown && self.duration.is_some_and(|d| d > 0.0)
    }
}

/// The three observations derived for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordObservations {
    pub lifetime: SurvivalObservation,
    pub career: SurvivalObservation,
    pub retirement_age: SurvivalObservation,
}

impl RecordObservations {
    /// Observation of a given kind
    #[must_use]
    pub const fn get(&self, kind: DurationKind) -> &SurvivalObservation {
        match kind {
            DurationKind::Lifetime => &self.lifetime,
            DurationKind::Career => &self.career,
            DurationKind::RetirementAge => &self.retirement_age,
        }
    }

    /// All three observations in emission order
    pub fn iter(&self) -> impl Iterator<Item = &SurvivalObservation> {
        [&self.lifetime, &self.career, &self.retirement_age].into_iter()
    }
}
