//! End-to-end pipeline
//!
//! Runs the four stages in order: normalize, derive durations, match the
//! cohort, emit survival rows. Each stage is a pure function of the previous
//! stage's output and the configuration, so a run is reproducible from its
//! inputs and its [`RunAudit`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::algorithm::duration::{DurationCalculator, DurationSummary};
use crate::algorithm::emit::{EmitReport, EmitSummary, Emission, Emitter, Strata};
use crate::algorithm::matching::{CohortMatcher, MatchedCohort, MatchingStats};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{BiographicalRecord, LifeStatus, RawRecord, RecordObservations};
use crate::normalize::{
    CorrectionTable, FieldIssue, NormalizationAudit, NormalizeOutcome, Normalizer, OrderViolation,
};
use crate::source::{InputPaths, LoadedInputs, load_inputs, load_inputs_async};
use crate::utils::io::{TableFormat, write_json, write_rows};

/// What was read from the sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub source: String,
    pub rows_read: usize,
    pub rows_without_id: usize,
    /// Subjects in the induction table, when one was supplied
    pub inductions: Option<usize>,
    pub corrections: usize,
}

/// Counts describing a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAudit {
    pub as_of_date: NaiveDate,
    pub config: PipelineConfig,
    pub load: LoadSummary,
    pub normalization: NormalizationAudit,
    pub durations: DurationSummary,
    pub matching: MatchingStats,
    pub survival: EmitReport,
    pub survival_summary: EmitSummary,
    pub matched: EmitReport,
    pub matched_summary: EmitSummary,
    pub elapsed_ms: u128,
}

/// Field-level problems found while normalizing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationIssues {
    pub field_issues: Vec<FieldIssue>,
    pub order_violations: Vec<OrderViolation>,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Typed records, in input order
    pub records: Vec<BiographicalRecord>,
    /// Life status per record
    pub statuses: Vec<LifeStatus>,
    /// Observations per record
    pub observations: Vec<RecordObservations>,
    pub issues: NormalizationIssues,
    pub cohort: MatchedCohort,
    /// Rows grouped by Hall of Fame membership
    pub survival: Emission,
    /// Post-induction rows of the matched sets
    pub matched: Emission,
    pub audit: RunAudit,
}

/// Drives a run from raw rows or from files
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the inputs and run every stage
    pub fn run(&self, inputs: &InputPaths) -> Result<PipelineOutput> {
        let loaded = load_inputs(inputs, &self.config)?;
        self.run_loaded(loaded)
    }

    /// Load the inputs concurrently and run every stage
    pub async fn run_async(&self, inputs: &InputPaths) -> Result<PipelineOutput> {
        let loaded = load_inputs_async(inputs, &self.config).await?;
        self.run_loaded(loaded)
    }

    /// Run every stage over loaded inputs
    pub fn run_loaded(&self, loaded: LoadedInputs) -> Result<PipelineOutput> {
        let load = LoadSummary {
            source: loaded.source_name,
            rows_read: loaded.extract.rows_read,
            rows_without_id: loaded.extract.rows_without_id,
            inductions: loaded.inductions.as_ref().map(|table| table.len()),
            corrections: loaded.corrections.len(),
        };
        self.run_raw(loaded.extract.records, loaded.corrections, load)
    }

    /// Normalize raw rows only
    #[must_use]
    pub fn normalize(&self, raws: Vec<RawRecord>, corrections: CorrectionTable) -> NormalizeOutcome {
        Normalizer::new(&self.config, corrections).normalize(raws)
    }

    /// Run every stage over raw rows
    pub fn run_raw(
        &self,
        raws: Vec<RawRecord>,
        corrections: CorrectionTable,
        load: LoadSummary,
    ) -> Result<PipelineOutput> {
        let start = Instant::now();

        info!("Stage 1/4: normalizing {} records", raws.len());
        let outcome = self.normalize(raws, corrections);

        info!("Stage 2/4: deriving durations");
        let calculator = DurationCalculator::new(&self.config);
        let records = outcome.records;
        let statuses: Vec<LifeStatus> = records.iter().map(|r| calculator.life_status(r)).collect();
        let observations = calculator.observe_all(&records);
        let durations = DurationSummary::from_observations(&observations);

        info!("Stage 3/4: matching cohort");
        let cohort = CohortMatcher::new(self.config.matching.clone()).match_cohort(&records, &statuses)?;

        info!("Stage 4/4: emitting survival rows");
        let emitter = Emitter::new(&self.config);
        let survival = emitter.emit(&records, &observations, Strata::HallOfFame)?;
        let matched = emitter.emit_matched(&records, &statuses, &cohort)?;

        let elapsed = start.elapsed();
        info!("Pipeline finished in {elapsed:?}");

        let audit = RunAudit {
            as_of_date: self.config.as_of_date,
            config: self.config.clone(),
            load,
            normalization: outcome.audit,
            durations,
            matching: cohort.stats().clone(),
            survival: survival.report.clone(),
            survival_summary: survival.summary.clone(),
            matched: matched.report.clone(),
            matched_summary: matched.summary.clone(),
            elapsed_ms: elapsed.as_millis(),
        };

        Ok(PipelineOutput {
            records,
            statuses,
            observations,
            issues: NormalizationIssues {
                field_issues: outcome.issues,
                order_violations: outcome.violations,
            },
            cohort,
            survival,
            matched,
            audit,
        })
    }
}

/// Output file names, without extension
pub mod file_names {
    pub const NORMALIZED: &str = "normalized_records";
    pub const SURVIVAL: &str = "survival";
    pub const MATCHED_SURVIVAL: &str = "matched_survival";
    pub const PAIRS: &str = "matched_pairs";
    pub const CONTROLS: &str = "matched_controls";
    pub const UNMATCHED: &str = "unmatched_treatments";
    pub const ISSUES: &str = "normalization_issues";
    pub const AUDIT: &str = "audit";
}

/// A treatment subject with no eligible control
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnmatchedRow {
    subject_id: String,
    birth_year: i32,
    index_year: i32,
}

fn table_path(dir: &Path, name: &str, format: TableFormat) -> PathBuf {
    dir.join(format!("{name}.{}", format.extension()))
}

/// Write the canonical form of normalized records
pub fn write_normalized(
    dir: &Path,
    format: TableFormat,
    records: &[BiographicalRecord],
) -> Result<PathBuf> {
    let path = table_path(dir, file_names::NORMALIZED, format);
    let rows: Vec<RawRecord> = records.iter().map(BiographicalRecord::to_raw).collect();
    write_rows(&path, &rows)?;
    Ok(path)
}

/// Write the issue lists as JSON
pub fn write_issues(dir: &Path, issues: &NormalizationIssues) -> Result<PathBuf> {
    let path = dir.join(format!("{}.json", file_names::ISSUES));
    write_json(&path, issues)?;
    Ok(path)
}

/// Write the pair view, the control view and the unmatched treatment subjects
pub fn write_cohort(dir: &Path, format: TableFormat, cohort: &MatchedCohort) -> Result<Vec<PathBuf>> {
    let pairs = table_path(dir, file_names::PAIRS, format);
    write_rows(&pairs, cohort.pairs())?;

    let controls = table_path(dir, file_names::CONTROLS, format);
    write_rows(&controls, cohort.control_view())?;

    let unmatched = table_path(dir, file_names::UNMATCHED, format);
    let rows: Vec<UnmatchedRow> = cohort
        .unmatched()
        .map(|t| UnmatchedRow {
            subject_id: t.subject_id.clone(),
            birth_year: t.birth_year,
            index_year: t.index_year,
        })
        .collect();
    write_rows(&unmatched, &rows)?;

    Ok(vec![pairs, controls, unmatched])
}

impl PipelineOutput {
    /// Write every output table plus the issues and the audit into `dir`
    pub fn write_all(&self, dir: &Path, format: TableFormat) -> Result<Vec<PathBuf>> {
        let mut written = vec![write_normalized(dir, format, &self.records)?];

        let survival = table_path(dir, file_names::SURVIVAL, format);
        write_rows(&survival, &self.survival.rows)?;
        written.push(survival);

        let matched = table_path(dir, file_names::MATCHED_SURVIVAL, format);
        write_rows(&matched, &self.matched.rows)?;
        written.push(matched);

        written.extend(write_cohort(dir, format, &self.cohort)?);
        written.push(write_issues(dir, &self.issues)?);

        let audit = dir.join(format!("{}.json", file_names::AUDIT));
        write_json(&audit, &self.audit)?;
        written.push(audit);

        info!("Wrote {} output files to {}", written.len(), dir.display());
        Ok(written)
    }
}
