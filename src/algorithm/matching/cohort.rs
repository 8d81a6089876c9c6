//! The matched cohort and its two views
//!
//! A control may be matched to several treatment subjects. The pair view
//! keeps one row per (treatment, control) and is what a paired analysis
//! needs; the control view keeps one row per distinct control with its
//! match count and is what an unweighted survival comparison needs.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::algorithm::matching::types::{
    ControlSummary, MatchedPair, MatchingStats, TreatmentSubject,
};

/// Result of matching treatment subjects to birth-year controls
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchedCohort {
    treatments: Vec<TreatmentSubject>,
    pairs: Vec<MatchedPair>,
    controls: Vec<ControlSummary>,
    stats: MatchingStats,
}

impl MatchedCohort {
    /// Assemble a cohort; the control view and summary counts are derived
    /// from the pairs
    #[must_use]
    pub fn new(
        treatments: Vec<TreatmentSubject>,
        pairs: Vec<MatchedPair>,
        mut stats: MatchingStats,
    ) -> Self {
        let controls = control_view(&pairs);
        let matched: FxHashSet<&str> = pairs.iter().map(|p| p.treatment_id.as_str()).collect();
        stats.treatments = treatments.len();
        stats.matched_treatments = matched.len();
        stats.pairs = pairs.len();
        stats.distinct_controls = controls.len();
        Self {
            treatments,
            pairs,
            controls,
            stats,
        }
    }

    /// Treatment subjects, in record order
    #[must_use]
    pub fn treatments(&self) -> &[TreatmentSubject] {
        &self.treatments
    }

    /// One row per (treatment, control) pair
    #[must_use]
    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    /// One row per distinct control, ordered by control id
    #[must_use]
    pub fn control_view(&self) -> &[ControlSummary] {
        &self.controls
    }

    /// Summary counts
    #[must_use]
    pub const fn stats(&self) -> &MatchingStats {
        &self.stats
    }

    /// Controls matched to one treatment subject
    pub fn matched_set<'a>(&'a self, treatment_id: &'a str) -> impl Iterator<Item = &'a MatchedPair> {
        self.pairs.iter().filter(move |p| p.treatment_id == treatment_id)
    }

    /// Treatment subjects with no eligible control
    pub fn unmatched(&self) -> impl Iterator<Item = &TreatmentSubject> {
        let matched: FxHashSet<&str> = self.pairs.iter().map(|p| p.treatment_id.as_str()).collect();
        self.treatments
            .iter()
            .filter(move |t| !matched.contains(t.subject_id.as_str()))
    }

    /// Number of treatment subjects a control was matched to
    #[must_use]
    pub fn match_count(&self, control_id: &str) -> usize {
        self.controls
            .binary_search_by(|c| c.control_id.as_str().cmp(control_id))
            .map_or(0, |i| self.controls[i].match_count)
    }

    /// Whether a subject is in the treatment set
    #[must_use]
    pub fn is_treatment(&self, subject_id: &str) -> bool {
        self.treatments.iter().any(|t| t.subject_id == subject_id)
    }
}

fn control_view(pairs: &[MatchedPair]) -> Vec<ControlSummary> {
    let mut by_control: FxHashMap<&str, ControlSummary> = FxHashMap::default();
    for pair in pairs {
        by_control
            .entry(pair.control_id.as_str())
            .and_modify(|summary| {
                summary.match_count += 1;
                summary.first_index_year = summary.first_index_year.min(pair.index_year);
                summary.last_index_year = summary.last_index_year.max(pair.index_year);
            })
            .or_insert_with(|| ControlSummary {
                control_id: pair.control_id.clone(),
                birth_year: pair.birth_year,
                match_count: 1,
                first_index_year: pair.index_year,
                last_index_year: pair.index_year,
            });
    }
    let mut controls: Vec<_> = by_control.into_values().collect();
    controls.sort_unstable_by(|a, b| a.control_id.cmp(&b.control_id));
    controls
}
