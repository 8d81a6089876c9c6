//! Cohort Matcher
//!
//! Pairs each Hall of Fame inductee who was alive at induction with every
//! non-treatment subject of the same birth year who was also alive in the
//! induction year:
//!
//! - `criteria`: matching rules and configuration
//! - `extraction`: treatment subject selection
//! - `control_data`: the birth-year control pool
//! - `sequential` / `parallel`: per-treatment selection
//! - `cohort`: the pair view and the control view of the result

pub mod cohort;
pub mod control_data;
pub mod criteria;
pub mod extraction;
pub mod matcher;
pub mod parallel;
pub mod sequential;
pub mod types;
pub mod validation;

pub use cohort::MatchedCohort;
pub use criteria::{
    MatchingConfig, MatchingConfigBuilder, MatchingCriteria, MatchingCriteriaBuilder,
    UnknownDeathPolicy,
};
pub use matcher::CohortMatcher;
pub use types::{ControlSummary, MatchedPair, MatchingStats, TreatmentExclusion, TreatmentSubject};
