//! Sequential matching and the per-treatment selection step

use indicatif::ProgressBar;
use log::info;
use rand::prelude::*;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::MatchingConfig;
use crate::algorithm::matching::types::{MatchedPair, TreatmentSubject, death_year};

/// Controls selected for one treatment subject
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreatmentMatches {
    pub pairs: Vec<MatchedPair>,
    /// Same-birth-year candidates not alive at the index year
    pub rejected_not_alive: usize,
    /// Eligible candidates dropped by the per-treatment cap
    pub dropped_by_cap: usize,
}

/// RNG for one treatment subject
///
/// With a seed, each treatment gets `seed + position`, so the draw for a
/// subject does not depend on which thread handles it.
pub(crate) fn treatment_rng(seed: Option<u64>, position: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(position as u64)),
        None => StdRng::from_os_rng(),
    }
}

/// Select the controls for one treatment subject
///
/// A candidate is eligible when it shares the birth year and is alive at the
/// index year under the configured boundary. Candidates whose survival is
/// unknown are skipped unless the policy assumes them alive.
#[must_use]
pub fn match_treatment(
    subject: &TreatmentSubject,
    position: usize,
    pool: &ControlPool,
    config: &MatchingConfig,
) -> TreatmentMatches {
    let criteria = &config.criteria;
    let mut eligible: SmallVec<[usize; 32]> = SmallVec::new();
    let mut rejected_not_alive = 0;

    for &candidate in pool.cohort(subject.birth_year) {
        if !criteria.is_birth_year_match(subject.birth_year, pool.birth_years[candidate]) {
            continue;
        }
        match criteria.is_alive_at_index(pool.statuses[candidate], subject.index_year) {
            Some(true) => eligible.push(candidate),
            Some(false) => rejected_not_alive += 1,
            None => {}
        }
    }

    let dropped_by_cap = match config.max_controls_per_treatment {
        Some(max) if eligible.len() > max => {
            let dropped = eligible.len() - max;
            let mut rng = treatment_rng(config.random_seed, position);
            let (chosen, _) = eligible.as_mut_slice().partial_shuffle(&mut rng, max);
            let mut chosen: SmallVec<[usize; 32]> = chosen.iter().copied().collect();
            chosen.sort_unstable();
            eligible = chosen;
            dropped
        }
        _ => 0,
    };

    let pairs = eligible
        .iter()
        .map(|&candidate| MatchedPair {
            treatment_id: subject.subject_id.clone(),
            control_id: pool.subject_ids[candidate].clone(),
            birth_year: subject.birth_year,
            index_year: subject.index_year,
            control_death_year: death_year(pool.statuses[candidate]),
        })
        .collect();

    TreatmentMatches {
        pairs,
        rejected_not_alive,
        dropped_by_cap,
    }
}

/// Match every treatment subject on the current thread
///
/// Results are in subject order.
#[must_use]
pub fn perform_sequential_matching(
    subjects: &[TreatmentSubject],
    pool: &ControlPool,
    config: &MatchingConfig,
    pb: &ProgressBar,
) -> Vec<TreatmentMatches> {
    info!("Matching {} treatment subjects sequentially", subjects.len());
    subjects
        .iter()
        .enumerate()
        .map(|(position, subject)| {
            let matches = match_treatment(subject, position, pool, config);
            pb.inc(1);
            matches
        })
        .collect()
}
