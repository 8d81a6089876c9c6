//! Duration Calculator
//!
//! Derives three survival observations per record from a fixed as-of date:
//!
//! - lifetime: birth to death, or to the as-of date when still alive
//! - career length: first to last game
//! - retirement age: birth to last game
//!
//! Every duration uses [`interval::fractional_years`]. A missing endpoint,
//! an out-of-order pair or an implausible age produces an `Unknown`
//! observation with a reason, never a zero or an assumed-alive value.

pub mod interval;

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::models::{
    BiographicalRecord, DurationKind, EventStatus, LifeStatus, RecordObservations, ResolvedDate,
    SurvivalObservation, UnknownReason,
};

pub use interval::{exceeds_years, fractional_years};

/// The fixed constants durations depend on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationPolicy {
    /// Snapshot date
    pub as_of_date: NaiveDate,
    /// Oldest age at which an undated subject may still be alive
    pub lifetime_ceiling_years: f64,
    /// Inactivity needed before a career counts as finished
    pub retirement_threshold_years: f64,
}

impl From<&PipelineConfig> for DurationPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            as_of_date: config.as_of_date,
            lifetime_ceiling_years: config.lifetime_ceiling_years,
            retirement_threshold_years: config.retirement_threshold_years,
        }
    }
}

/// Computes survival observations for normalized records
#[derive(Debug, Clone)]
pub struct DurationCalculator {
    policy: DurationPolicy,
    parallel: bool,
}

impl DurationCalculator {
    /// Create a calculator from the pipeline configuration
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            policy: DurationPolicy::from(config),
            parallel: config.parallel,
        }
    }

    /// Create a calculator from an explicit policy
    #[must_use]
    pub const fn with_policy(policy: DurationPolicy) -> Self {
        Self {
            policy,
            parallel: false,
        }
    }

    /// The policy in use
    #[must_use]
    pub const fn policy(&self) -> &DurationPolicy {
        &self.policy
    }

    /// Life status as far as the record affirmatively supports it
    ///
    /// A subject counts as alive only with no death date, no death-context
    /// field, a known birth date and an age at the as-of date within the
    /// ceiling.
    #[must_use]
    pub fn life_status(&self, record: &BiographicalRecord) -> LifeStatus {
        if let Some(year) = record.death_year() {
            return LifeStatus::Deceased { year };
        }
        if record.has_death_context() {
            return LifeStatus::Indeterminate;
        }
        match record.birth_date {
            Some(birth) => match fractional_years(birth.date, self.policy.as_of_date) {
                Some(age) if age <= self.policy.lifetime_ceiling_years => LifeStatus::Alive,
                _ => LifeStatus::Indeterminate,
            },
            None => LifeStatus::Indeterminate,
        }
    }

    /// Birth to death, or birth to the as-of date
    #[must_use]
    pub fn lifetime(&self, record: &BiographicalRecord) -> SurvivalObservation {
        let kind = DurationKind::Lifetime;
        let Some(birth) = record.birth_date else {
            return self.unknown(record, kind, UnknownReason::MissingDate);
        };

        if let Some(death) = record.death_date {
            if death.date > self.policy.as_of_date {
                return self.unknown(record, kind, UnknownReason::AfterAsOf);
            }
            return match fractional_years(birth.date, death.date) {
                Some(years) => self.known(record, kind, years, EventStatus::Observed),
                None => self.unknown(record, kind, UnknownReason::NegativeInterval),
            };
        }

        if record.has_death_context() {
            return self.unknown(record, kind, UnknownReason::UndatedDeath);
        }

        match fractional_years(birth.date, self.policy.as_of_date) {
            None => self.unknown(record, kind, UnknownReason::AfterAsOf),
            Some(age) if age > self.policy.lifetime_ceiling_years => {
                self.unknown(record, kind, UnknownReason::ExceedsCeiling)
            }
            Some(age) => self.known(record, kind, age, EventStatus::Censored),
        }
    }

    /// First game to last game
    #[must_use]
    pub fn career(&self, record: &BiographicalRecord) -> SurvivalObservation {
        self.until_career_end(record, DurationKind::Career, record.career_start_date)
    }

    /// Birth to last game
    #[must_use]
    pub fn retirement_age(&self, record: &BiographicalRecord) -> SurvivalObservation {
        self.until_career_end(record, DurationKind::RetirementAge, record.birth_date)
    }

    /// Whether a career ending on `career_end` is over at the as-of date
    ///
    /// A recorded death ends a career regardless of the threshold.
    #[must_use]
    pub fn is_retired(&self, record: &BiographicalRecord, career_end: NaiveDate) -> bool {
        record.death_date.is_some()
            || exceeds_years(
                career_end,
                self.policy.as_of_date,
                self.policy.retirement_threshold_years,
            )
    }

    fn until_career_end(
        &self,
        record: &BiographicalRecord,
        kind: DurationKind,
        start: Option<ResolvedDate>,
    ) -> SurvivalObservation {
        let (Some(start), Some(end)) = (start, record.career_end_date) else {
            return self.unknown(record, kind, UnknownReason::MissingDate);
        };
        if end.date > self.policy.as_of_date {
            return self.unknown(record, kind, UnknownReason::AfterAsOf);
        }
        let Some(years) = fractional_years(start.date, end.date) else {
            return self.unknown(record, kind, UnknownReason::NegativeInterval);
        };
        let status = if self.is_retired(record, end.date) {
            EventStatus::Observed
        } else {
            EventStatus::Censored
        };
        self.known(record, kind, years, status)
    }

    /// All three observations for one record
    #[must_use]
    pub fn observe(&self, record: &BiographicalRecord) -> RecordObservations {
        RecordObservations {
            lifetime: self.lifetime(record),
            career: self.career(record),
            retirement_age: self.retirement_age(record),
        }
    }

    /// Observations for every record, in record order
    #[must_use]
    pub fn observe_all(&self, records: &[BiographicalRecord]) -> Vec<RecordObservations> {
        let start = Instant::now();
        let observations: Vec<RecordObservations> = if self.parallel {
            records.par_iter().map(|r| self.observe(r)).collect()
        } else {
            records.iter().map(|r| self.observe(r)).collect()
        };

        let summary = DurationSummary::from_observations(&observations);
        let violations = summary.sanity_violations();
        if violations > 0 {
            warn!("{violations} observations violate a sanity bound and are unknown");
        }
        info!(
            "Derived {} observations for {} records in {:?}",
            observations.len() * DurationKind::ALL.len(),
            records.len(),
            start.elapsed()
        );
        observations
    }

    fn known(
        &self,
        record: &BiographicalRecord,
        kind: DurationKind,
        years: f64,
        status: EventStatus,
    ) -> SurvivalObservation {
        SurvivalObservation::known(
            &record.subject_id,
            kind,
            years,
            status,
            record.hall_of_fame,
            self.policy.as_of_date,
        )
    }

    fn unknown(
        &self,
        record: &BiographicalRecord,
        kind: DurationKind,
        reason: UnknownReason,
    ) -> SurvivalObservation {
        if reason.is_sanity_violation() {
            debug!("{}: {kind} unknown ({reason:?})", record.subject_id);
        }
        SurvivalObservation::unknown(
            &record.subject_id,
            kind,
            reason,
            record.hall_of_fame,
            self.policy.as_of_date,
        )
    }
}

/// Status counts for one duration kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub observed: usize,
    pub censored: usize,
    /// Unknown observations by reason
    pub unknown: BTreeMap<UnknownReason, usize>,
}

impl KindCounts {
    /// Total unknown observations
    #[must_use]
    pub fn unknown_total(&self) -> usize {
        self.unknown.values().sum()
    }
}

/// Status counts for every duration kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSummary {
    pub kinds: BTreeMap<DurationKind, KindCounts>,
}

impl DurationSummary {
    /// Count statuses over a set of observations
    #[must_use]
    pub fn from_observations(observations: &[RecordObservations]) -> Self {
        let mut summary = Self::default();
        for observation in observations.iter().flat_map(RecordObservations::iter) {
            let counts = summary.kinds.entry(observation.kind).or_default();
            match (observation.status, observation.unknown_reason) {
                (EventStatus::Observed, _) => counts.observed += 1,
                (EventStatus::Censored, _) => counts.censored += 1,
                (EventStatus::Unknown, reason) => {
                    let reason = reason.unwrap_or(UnknownReason::MissingDate);
                    *counts.unknown.entry(reason).or_default() += 1;
                }
            }
        }
        summary
    }

    /// Observations made unknown by a sanity bound
    #[must_use]
    pub fn sanity_violations(&self) -> usize {
        self.kinds
            .values()
            .flat_map(|counts| counts.unknown.iter())
            .filter(|(reason, _)| reason.is_sanity_violation())
            .map(|(_, count)| count)
            .sum()
    }
}
