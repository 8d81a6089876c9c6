//! Parallel matching implementation
//!
//! Treatment subjects are grouped by birth year and the groups are matched
//! on the rayon pool. Each subject draws from its own seeded RNG, so the
//! result equals the sequential one.

use indicatif::ProgressBar;
use log::info;
use rayon::prelude::*;

use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::MatchingConfig;
use crate::algorithm::matching::extraction::group_by_birth_year;
use crate::algorithm::matching::sequential::{TreatmentMatches, match_treatment};
use crate::algorithm::matching::types::TreatmentSubject;

/// Match every treatment subject using rayon
///
/// Results are in subject order.
#[must_use]
pub fn perform_parallel_matching(
    subjects: &[TreatmentSubject],
    pool: &ControlPool,
    config: &MatchingConfig,
    pb: &ProgressBar,
) -> Vec<TreatmentMatches> {
    let num_threads = rayon::current_num_threads();
    info!("Using parallel processing with {num_threads} threads");

    let groups = group_by_birth_year(subjects);
    info!("Grouped treatment subjects into {} birth years", groups.len());

    let group_results: Vec<Vec<(usize, TreatmentMatches)>> = groups
        .par_iter()
        .map(|(_, positions)| {
            positions
                .iter()
                .map(|&position| {
                    let matches = match_treatment(&subjects[position], position, pool, config);
                    pb.inc(1);
                    (position, matches)
                })
                .collect()
        })
        .collect();

    let mut ordered: Vec<TreatmentMatches> = vec![TreatmentMatches::default(); subjects.len()];
    for (position, matches) in group_results.into_iter().flatten() {
        ordered[position] = matches;
    }
    ordered
}
