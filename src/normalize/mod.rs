//! Record Normalizer
//!
//! Turns string-typed source rows into typed [`BiographicalRecord`]s:
//!
//! 1. Apply the correction table (one lookup per subject, before parsing)
//! 2. Parse dates at their recorded precision, imputing missing parts
//! 3. Parse height, weight, handedness and the Hall of Fame flag
//! 4. Check date ordering and record violations
//!
//! A field that fails to parse becomes `None` and is reported as a
//! [`FieldIssue`]; the record itself is always kept.

pub mod corrections;
pub mod date;
pub mod height;
pub mod issue;

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use indicatif::ParallelProgressIterator;
use log::{debug, info, warn};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::PipelineConfig;
use crate::models::{
    BiographicalRecord, DeathContext, HallOfFame, Handedness, RawRecord, RecordField,
    ResolvedDate,
};
use crate::utils::logging::progress;

pub use corrections::{Correction, CorrectionTable};
pub use date::{parse_date_parts, parse_partial_date, parse_year};
pub use height::{parse_height, parse_weight};
pub use issue::{FieldIssue, OrderViolation, ParseFailure};

/// Inputs at or above this size get a progress bar
const PROGRESS_THRESHOLD: usize = 10_000;

/// Per-run counts for the normalization stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationAudit {
    /// Raw rows received
    pub records_in: usize,
    /// Typed records produced
    pub records_out: usize,
    /// Rows dropped because their subject id was already seen
    pub duplicate_subject_ids: usize,
    /// Field overwrites performed by the correction table
    pub corrections_applied: usize,
    /// Parse failures per field
    pub field_failures: BTreeMap<RecordField, usize>,
    /// Dates resolved from a year or year-month, per field
    pub imputed_dates: BTreeMap<RecordField, usize>,
    /// Records with at least one out-of-order date pair
    pub order_violations: usize,
}

impl NormalizationAudit {
    /// Total parse failures across all fields
    #[must_use]
    pub fn total_field_failures(&self) -> usize {
        self.field_failures.values().sum()
    }
}

/// Result of normalizing one raw row
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    /// The typed record
    pub record: BiographicalRecord,
    /// Fields that failed to parse
    pub issues: Vec<FieldIssue>,
    /// Out-of-order date pairs
    pub violations: Vec<OrderViolation>,
    /// Fields overwritten by the correction table
    pub corrected: SmallVec<[RecordField; 2]>,
}

/// Result of normalizing a whole table
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// Typed records, in input order
    pub records: Vec<BiographicalRecord>,
    /// Every field failure
    pub issues: Vec<FieldIssue>,
    /// Every out-of-order date pair
    pub violations: Vec<OrderViolation>,
    /// Counts
    pub audit: NormalizationAudit,
}

/// The record normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    corrections: CorrectionTable,
    max_height_inches: u32,
    min_weight_pounds: u32,
    max_weight_pounds: u32,
    as_of_date: NaiveDate,
    parallel: bool,
}

impl Normalizer {
    /// Create a normalizer from the pipeline configuration and a correction table
    #[must_use]
    pub fn new(config: &PipelineConfig, corrections: CorrectionTable) -> Self {
        Self {
            corrections,
            max_height_inches: config.max_height_inches,
            min_weight_pounds: config.min_weight_pounds,
            max_weight_pounds: config.max_weight_pounds,
            as_of_date: config.as_of_date,
            parallel: config.parallel,
        }
    }

    /// The correction table in use
    #[must_use]
    pub const fn corrections(&self) -> &CorrectionTable {
        &self.corrections
    }

    /// Normalize a table of raw rows
    ///
    /// Rows whose subject id, after corrections, was already seen are
    /// dropped and counted.
    #[must_use]
    pub fn normalize(&self, raws: Vec<RawRecord>) -> NormalizeOutcome {
        let start = Instant::now();
        let records_in = raws.len();

        let normalized: Vec<NormalizedRecord> = if self.parallel {
            let pb = if raws.len() >= PROGRESS_THRESHOLD {
                progress::create_main_progress_bar(raws.len() as u64, Some("Normalizing records"))
            } else {
                progress::hidden()
            };
            let out = raws
                .into_par_iter()
                .progress_with(pb.clone())
                .map(|raw| self.normalize_one(raw))
                .collect();
            progress::finish_and_clear(&pb);
            out
        } else {
            raws.into_iter().map(|raw| self.normalize_one(raw)).collect()
        };

        let mut outcome = NormalizeOutcome {
            audit: NormalizationAudit {
                records_in,
                ..NormalizationAudit::default()
            },
            ..NormalizeOutcome::default()
        };
        outcome.records.reserve(normalized.len());

        // Ids are compared after corrections, which may rewrite them.
        let mut seen = FxHashSet::default();
        for item in normalized {
            let audit = &mut outcome.audit;
            if !seen.insert(item.record.subject_id.clone()) {
                audit.duplicate_subject_ids += 1;
                debug!("Dropping duplicate row for subject {}", item.record.subject_id);
                continue;
            }
            audit.corrections_applied += item.corrected.len();
            for issue in &item.issues {
                *audit.field_failures.entry(issue.field).or_default() += 1;
            }
            for (field, date) in dated_fields(&item.record) {
                if date.is_imputed() {
                    *audit.imputed_dates.entry(field).or_default() += 1;
                }
            }
            if !item.violations.is_empty() {
                audit.order_violations += 1;
            }
            outcome.issues.extend(item.issues);
            outcome.violations.extend(item.violations);
            outcome.records.push(item.record);
        }
        outcome.audit.records_out = outcome.records.len();

        if outcome.audit.duplicate_subject_ids > 0 {
            warn!(
                "Dropped {} rows with duplicate subject ids",
                outcome.audit.duplicate_subject_ids
            );
        }
        if outcome.audit.order_violations > 0 {
            warn!(
                "{} records have dates out of order",
                outcome.audit.order_violations
            );
        }
        info!(
            "Normalized {} of {} rows in {:?} ({} field failures, {} corrections applied)",
            outcome.audit.records_out,
            records_in,
            start.elapsed(),
            outcome.audit.total_field_failures(),
            outcome.audit.corrections_applied
        );

        outcome
    }

    /// Normalize a single raw row
    #[must_use]
    pub fn normalize_one(&self, mut raw: RawRecord) -> NormalizedRecord {
        let corrected = self.corrections.apply(&mut raw);
        let mut issues = Vec::new();
        let subject_id = raw.subject_id.clone();

        let mut fail = |field: RecordField, value: &str, failure: ParseFailure| {
            debug!("{subject_id}: {field} {value:?} rejected: {failure}");
            issues.push(FieldIssue {
                subject_id: subject_id.clone(),
                field,
                raw: value.to_string(),
                failure,
            });
        };

        let mut date_field = |field: RecordField| -> Option<ResolvedDate> {
            let value = raw.get(field)?;
            match parse_partial_date(value) {
                Ok(date) => date,
                Err(failure) => {
                    fail(field, value, failure);
                    None
                }
            }
        };

        let birth_date = date_field(RecordField::BirthDate);
        let death_date = date_field(RecordField::DeathDate);
        let career_start_date = date_field(RecordField::CareerStart);
        let career_end_date = date_field(RecordField::CareerEnd);

        let height_inches = raw.height.as_deref().and_then(|value| {
            parse_height(value, self.max_height_inches)
                .map_err(|failure| fail(RecordField::Height, value, failure))
                .ok()
                .flatten()
        });
        let weight_pounds = raw.weight.as_deref().and_then(|value| {
            parse_weight(value, self.min_weight_pounds, self.max_weight_pounds)
                .map_err(|failure| fail(RecordField::Weight, value, failure))
                .ok()
                .flatten()
        });

        let hall_of_fame = raw
            .hall_of_fame
            .as_deref()
            .map_or(HallOfFame::Out, HallOfFame::from);
        let induction_year = raw.induction_year.as_deref().and_then(|value| {
            if !hall_of_fame.is_in() {
                fail(
                    RecordField::InductionYear,
                    value,
                    ParseFailure::Implausible("induction year without membership".to_string()),
                );
                return None;
            }
            parse_year(value)
                .map_err(|failure| fail(RecordField::InductionYear, value, failure))
                .ok()
        });

        let record = BiographicalRecord {
            subject_id: raw.subject_id.clone(),
            name_first: clean(raw.name_first),
            name_last: clean(raw.name_last),
            birth_date,
            death_date,
            career_start_date,
            career_end_date,
            height_inches,
            weight_pounds,
            bats: raw.bats.as_deref().map_or(Handedness::Unknown, Handedness::from),
            throws: raw.throws.as_deref().map_or(Handedness::Unknown, Handedness::from),
            hall_of_fame,
            induction_year,
            birth_city: clean(raw.birth_city),
            birth_state: clean(raw.birth_state),
            birth_country: clean(raw.birth_country),
            death_context: DeathContext {
                city: clean(raw.death_city),
                state: clean(raw.death_state),
                country: clean(raw.death_country),
                cemetery: clean(raw.cemetery),
            },
        };

        let violations = order_violations(&record, self.as_of_date);

        NormalizedRecord {
            record,
            issues,
            violations,
            corrected,
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn dated_fields(record: &BiographicalRecord) -> impl Iterator<Item = (RecordField, ResolvedDate)> {
    [
        (RecordField::BirthDate, record.birth_date),
        (RecordField::DeathDate, record.death_date),
        (RecordField::CareerStart, record.career_start_date),
        (RecordField::CareerEnd, record.career_end_date),
    ]
    .into_iter()
    .filter_map(|(field, date)| date.map(|d| (field, d)))
}

/// `a` must not come after `b`; imputed dates are only compared by year
fn out_of_order(a: ResolvedDate, b: ResolvedDate) -> bool {
    if a.is_imputed() || b.is_imputed() {
        a.year() > b.year()
    } else {
        a.date > b.date
    }
}

/// Check birth <= career start <= career end <= (death or as-of)
fn order_violations(record: &BiographicalRecord, as_of_date: NaiveDate) -> Vec<OrderViolation> {
    let chain = [
        (RecordField::BirthDate, record.birth_date),
        (RecordField::CareerStart, record.career_start_date),
        (RecordField::CareerEnd, record.career_end_date),
        (RecordField::DeathDate, record.death_date),
    ];
    let mut violations = Vec::new();
    for (i, &(earlier, a)) in chain.iter().enumerate() {
        let Some(a) = a else { continue };
        for &(later, b) in &chain[i + 1..] {
            let Some(b) = b else { continue };
            if out_of_order(a, b) {
                violations.push(OrderViolation {
                    subject_id: record.subject_id.clone(),
                    earlier,
                    later: Some(later),
                });
            }
        }
    }

    // Nothing may lie beyond the snapshot date.
    for (field, date) in dated_fields(record) {
        if date.date > as_of_date && !(date.is_imputed() && date.year() == as_of_date.year()) {
            violations.push(OrderViolation {
                subject_id: record.subject_id.clone(),
                earlier: field,
                later: None,
            });
        }
    }
    violations
}
