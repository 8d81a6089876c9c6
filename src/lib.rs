//! Survival-cohort construction for Hall of Fame longevity studies.
//!
//! Turns Retrosheet and Lahman biographical tables into the rows an external
//! Kaplan-Meier or Cox routine consumes:
//!
//! 1. [`normalize`]: raw text rows to typed records, with a correction table
//! 2. [`algorithm::duration`]: lifetime, career and retirement age with
//!    censoring status
//! 3. [`algorithm::matching`]: birth-year matched controls for inductees
//! 4. [`algorithm::emit`]: model-ready rows with exclusion counts

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod utils;

// Core types
pub use config::{PipelineConfig, PipelineConfigBuilder, SourceConfig};
pub use error::{LongevityError, Result};
pub use pipeline::{Pipeline, PipelineOutput, RunAudit};

// Domain models
pub use models::{
    BiographicalRecord, DurationKind, EventStatus, HallOfFame, Handedness, IndexBoundary,
    LifeStatus, RawRecord, RecordField, ResolvedDate, SurvivalObservation,
};

// Stages
pub use algorithm::duration::{DurationCalculator, DurationSummary};
pub use algorithm::emit::{EmitReport, Emission, Emitter, Strata, SurvivalRow};
pub use algorithm::matching::{
    CohortMatcher, MatchedCohort, MatchingConfig, MatchingCriteria, UnknownDeathPolicy,
};
pub use normalize::{Correction, CorrectionTable, NormalizeOutcome, Normalizer};

// Sources
pub use source::{InputPaths, load_inputs, load_inputs_async};

// Arrow types
pub use arrow::record_batch::RecordBatch;
