//! Survival Record Emitter
//!
//! Packages observations into the `(duration, event, group, covariates)`
//! rows an external Kaplan-Meier or Cox routine consumes. Observations that
//! cannot be modelled are dropped here and counted by reason, so the number
//! of subjects lost to bad data is always visible.

pub mod row;
pub mod summary;

use chrono::NaiveDate;
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::algorithm::duration::fractional_years;
use crate::algorithm::matching::{MatchedCohort, TreatmentSubject};
use crate::config::PipelineConfig;
use crate::error::{LongevityError, Result};
use crate::models::{BiographicalRecord, DurationKind, EventStatus, LifeStatus, RecordObservations};

pub use row::SurvivalRow;
pub use summary::{EmitSummary, GroupCounts, Tally};

/// Kind label of matched post-induction rows
pub const POST_INDUCTION: &str = "post_induction";

/// Where the group indicator comes from
#[derive(Debug, Clone, Copy)]
pub enum Strata<'a> {
    /// Hall of Fame membership of every record
    HallOfFame,
    /// Treatment subjects (1) and distinct controls (0) of a cohort; other
    /// records are left out
    Cohort(&'a MatchedCohort),
}

/// Exclusion counts of one emission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitReport {
    /// Observations considered
    pub candidates: usize,
    /// Rows produced
    pub emitted: usize,
    /// Excluded: event status unknown
    pub unknown_status: usize,
    /// Excluded: status known but no duration
    pub null_duration: usize,
    /// Excluded: duration zero or negative
    pub non_positive_duration: usize,
    /// Excluded: subject is neither a treatment subject nor a control
    pub outside_cohort: usize,
    /// Treatment subjects without a matched set
    pub unmatched_treatments: usize,
}

impl EmitReport {
    /// Every excluded observation
    #[must_use]
    pub const fn excluded(&self) -> usize {
        self.unknown_status + self.null_duration + self.non_positive_duration + self.outside_cohort
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: &Self) {
        self.candidates += other.candidates;
        self.emitted += other.emitted;
        self.unknown_status += other.unknown_status;
        self.null_duration += other.null_duration;
        self.non_positive_duration += other.non_positive_duration;
        self.outside_cohort += other.outside_cohort;
        self.unmatched_treatments += other.unmatched_treatments;
    }
}

/// Rows together with their exclusion counts
#[derive(Debug, Clone, Default)]
pub struct Emission {
    pub rows: Vec<SurvivalRow>,
    pub report: EmitReport,
    pub summary: EmitSummary,
}

impl Emission {
    fn push(
        &mut self,
        record: &BiographicalRecord,
        kind: &str,
        group: u8,
        status: EventStatus,
        duration: Option<f64>,
    ) -> Option<&mut SurvivalRow> {
        self.report.candidates += 1;
        let event = match status.indicator() {
            Some(event) => event,
            None => {
                self.report.unknown_status += 1;
                self.summary.record(kind, group, Tally::Excluded);
                return None;
            }
        };
        let Some(duration) = duration else {
            self.report.null_duration += 1;
            self.summary.record(kind, group, Tally::Excluded);
            return None;
        };
        if duration <= 0.0 {
            self.report.non_positive_duration += 1;
            self.summary.record(kind, group, Tally::Excluded);
            return None;
        }

        let tally = if event == 1 { Tally::Observed } else { Tally::Censored };
        self.summary.record(kind, group, tally);
        self.report.emitted += 1;
        self.rows.push(SurvivalRow::new(record, kind, duration, event, group));
        self.rows.last_mut()
    }

    fn log(&self, label: &str) {
        info!(
            "Emitted {} {label} rows from {} candidates",
            self.report.emitted, self.report.candidates
        );
        let report = &self.report;
        if report.excluded() > 0 {
            warn!(
                "Excluded {label} rows: {} unknown status, {} null duration, {} non-positive duration, {} outside cohort",
                report.unknown_status,
                report.null_duration,
                report.non_positive_duration,
                report.outside_cohort
            );
        }
        self.summary.log();
    }
}

/// Converts observations into model-ready rows
#[derive(Debug, Clone)]
pub struct Emitter {
    as_of_date: NaiveDate,
    kinds: Vec<DurationKind>,
}

impl Emitter {
    /// An emitter for every duration kind
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            as_of_date: config.as_of_date,
            kinds: DurationKind::ALL.to_vec(),
        }
    }

    /// Restrict emission to some duration kinds
    #[must_use]
    pub fn with_kinds(mut self, kinds: &[DurationKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    /// One row per record per kind, grouped by `strata`
    ///
    /// `observations[i]` must belong to `records[i]`.
    pub fn emit(
        &self,
        records: &[BiographicalRecord],
        observations: &[RecordObservations],
        strata: Strata<'_>,
    ) -> Result<Emission> {
        if records.len() != observations.len() {
            return Err(LongevityError::validation(format!(
                "{} records but {} observation sets",
                records.len(),
                observations.len()
            )));
        }

        let treatment_ids: FxHashSet<&str> = match strata {
            Strata::Cohort(cohort) => cohort
                .treatments()
                .iter()
                .map(|t| t.subject_id.as_str())
                .collect(),
            Strata::HallOfFame => FxHashSet::default(),
        };

        let mut emission = Emission::default();
        for (record, observed) in records.iter().zip(observations) {
            if observed.lifetime.subject_id != record.subject_id {
                return Err(LongevityError::validation(format!(
                    "Observations for {} are aligned with record {}",
                    observed.lifetime.subject_id, record.subject_id
                )));
            }
            let group = match strata {
                Strata::HallOfFame => Some(record.hall_of_fame.indicator()),
                Strata::Cohort(cohort) => {
                    if treatment_ids.contains(record.subject_id.as_str()) {
                        Some(1)
                    } else if cohort.match_count(&record.subject_id) > 0 {
                        Some(0)
                    } else {
                        None
                    }
                }
            };
            for kind in &self.kinds {
                let Some(group) = group else {
                    emission.report.candidates += 1;
                    emission.report.outside_cohort += 1;
                    continue;
                };
                let observation = observed.get(*kind);
                emission.push(record, kind.as_str(), group, observation.status, observation.duration);
            }
        }

        emission.log("survival");
        Ok(emission)
    }

    /// Post-induction survival for every matched set
    ///
    /// Each matched set yields a row for the treatment subject (group 1) and
    /// one per control (group 0), all measured from the treatment subject's
    /// index date to death or the as-of date. A control matched to several
    /// treatment subjects appears once per set. `statuses[i]` is the life
    /// status of `records[i]`.
    pub fn emit_matched(
        &self,
        records: &[BiographicalRecord],
        statuses: &[LifeStatus],
        cohort: &MatchedCohort,
    ) -> Result<Emission> {
        if records.len() != statuses.len() {
            return Err(LongevityError::validation(format!(
                "{} records but {} life statuses",
                records.len(),
                statuses.len()
            )));
        }

        let by_id: FxHashMap<&str, (&BiographicalRecord, LifeStatus)> = records
            .iter()
            .zip(statuses)
            .map(|(record, status)| (record.subject_id.as_str(), (record, *status)))
            .collect();
        let treatments: FxHashMap<&str, &TreatmentSubject> = cohort
            .treatments()
            .iter()
            .map(|t| (t.subject_id.as_str(), t))
            .collect();
        let lookup = |id: &str| {
            by_id
                .get(id)
                .copied()
                .ok_or_else(|| LongevityError::validation(format!("Matched subject {id} has no record")))
        };

        let mut emission = Emission::default();
        emission.report.unmatched_treatments = cohort.unmatched().count();

        for set in cohort.pairs().chunk_by(|a, b| a.treatment_id == b.treatment_id) {
            let treatment_id = set[0].treatment_id.as_str();
            let treatment = treatments.get(treatment_id).ok_or_else(|| {
                LongevityError::validation(format!("Pair refers to unknown treatment {treatment_id}"))
            })?;

            let members = std::iter::once((treatment_id, 1_u8))
                .chain(set.iter().map(|pair| (pair.control_id.as_str(), 0_u8)));
            for (subject_id, group) in members {
                let (record, status) = lookup(subject_id)?;
                let (event, duration) = self.post_index(record, status, treatment.index_date);
                if let Some(row) = emission.push(record, POST_INDUCTION, group, event, duration) {
                    row.matched_set = Some(treatment_id.to_string());
                }
            }
        }

        emission.log("matched");
        Ok(emission)
    }

    /// Event status and signed duration from `index_date`
    fn post_index(
        &self,
        record: &BiographicalRecord,
        status: LifeStatus,
        index_date: NaiveDate,
    ) -> (EventStatus, Option<f64>) {
        let end = match (status, record.death_date) {
            (LifeStatus::Deceased { .. }, Some(death)) if death.date <= self.as_of_date => {
                Some((EventStatus::Observed, death.date))
            }
            (LifeStatus::Alive, None) => Some((EventStatus::Censored, self.as_of_date)),
            _ => None,
        };
        match end {
            Some((event, end)) => (event, signed_years(index_date, end)),
            None => (EventStatus::Unknown, None),
        }
    }
}

/// Exact-day years from `start` to `end`, negative when `end` comes first
fn signed_years(start: NaiveDate, end: NaiveDate) -> Option<f64> {
    fractional_years(start, end).or_else(|| fractional_years(end, start).map(|years| -years))
}
