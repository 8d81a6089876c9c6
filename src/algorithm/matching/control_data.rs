//! Control pool indexed by birth year
//!
//! Candidates are stored struct-of-arrays and bucketed by birth year so each
//! treatment subject only looks at its own cohort.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::algorithm::matching::criteria::MatchingCriteria;
use crate::models::{BiographicalRecord, LifeStatus};

/// Candidate controls, bucketed by birth year
#[derive(Debug)]
pub struct ControlPool {
    /// Subject ids
    pub subject_ids: Vec<String>,
    /// Birth years
    pub birth_years: Vec<i32>,
    /// Life status of each candidate
    pub statuses: Vec<LifeStatus>,
    /// Pool positions per birth year, in record order
    by_birth_year: FxHashMap<i32, SmallVec<[usize; 32]>>,
}

impl ControlPool {
    /// Build the pool from every record that may serve as a control
    ///
    /// Treatment subjects never enter the pool. With `exclude_all_inductees`
    /// no inductee does.
    #[must_use]
    pub fn new(
        records: &[BiographicalRecord],
        statuses: &[LifeStatus],
        treatment_ids: &FxHashSet<&str>,
        criteria: &MatchingCriteria,
    ) -> Self {
        let mut pool = Self {
            subject_ids: Vec::new(),
            birth_years: Vec::new(),
            statuses: Vec::new(),
            by_birth_year: FxHashMap::default(),
        };

        for (record, status) in records.iter().zip(statuses) {
            let Some(birth_year) = record.birth_year() else {
                continue;
            };
            if treatment_ids.contains(record.subject_id.as_str()) {
                continue;
            }
            if criteria.exclude_all_inductees && record.hall_of_fame.is_in() {
                continue;
            }
            let position = pool.subject_ids.len();
            pool.subject_ids.push(record.subject_id.clone());
            pool.birth_years.push(birth_year);
            pool.statuses.push(*status);
            pool.by_birth_year.entry(birth_year).or_default().push(position);
        }
        pool
    }

    /// Pool positions of candidates born in `birth_year`
    #[must_use]
    pub fn cohort(&self, birth_year: i32) -> &[usize] {
        self.by_birth_year
            .get(&birth_year)
            .map_or(&[], |positions| positions.as_slice())
    }

    /// Number of candidates
    #[must_use]
    pub fn len(&self) -> usize {
        self.subject_ids.len()
    }

    /// Whether the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject_ids.is_empty()
    }

    /// Number of distinct birth years in the pool
    #[must_use]
    pub fn birth_year_count(&self) -> usize {
        self.by_birth_year.len()
    }
}
