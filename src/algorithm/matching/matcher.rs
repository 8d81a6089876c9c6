//! Core matching algorithm implementation
//!
//! [`CohortMatcher`] selects the treatment subjects, builds the birth-year
//! control pool and hands the per-treatment work to the sequential or the
//! parallel path.

use std::time::Instant;

use log::{info, warn};
use rustc_hash::FxHashSet;

use crate::algorithm::matching::cohort::MatchedCohort;
use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::{MatchingConfig, UnknownDeathPolicy};
use crate::algorithm::matching::extraction::extract_treatments;
use crate::algorithm::matching::parallel::perform_parallel_matching;
use crate::algorithm::matching::sequential::perform_sequential_matching;
use crate::algorithm::matching::types::MatchingStats;
use crate::algorithm::matching::validation::validate_inputs;
use crate::error::Result;
use crate::models::{BiographicalRecord, LifeStatus};
use crate::utils::logging::progress;

/// Matches Hall of Fame inductees to same-birth-year controls
#[derive(Debug, Clone)]
pub struct CohortMatcher {
    config: MatchingConfig,
}

impl CohortMatcher {
    /// Treatment count at which matching switches to the rayon pool
    pub const PARALLEL_THRESHOLD: usize = 1000;

    /// Create a new matcher with the given configuration
    #[must_use]
    pub const fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Match treatment subjects to controls
    ///
    /// `statuses[i]` is the life status of `records[i]`. An input without any
    /// treatment subject yields an empty cohort.
    pub fn match_cohort(
        &self,
        records: &[BiographicalRecord],
        statuses: &[LifeStatus],
    ) -> Result<MatchedCohort> {
        let start_time = Instant::now();
        validate_inputs(records, statuses)?;

        let criteria = &self.config.criteria;
        let extracted = extract_treatments(records, statuses, criteria);
        let mut stats = MatchingStats {
            inductees: extracted.inductees,
            treatment_exclusions: extracted.exclusions,
            ..MatchingStats::default()
        };
        for (reason, count) in &stats.treatment_exclusions {
            info!("{count} inductees excluded from treatment: {reason}");
        }

        let subjects = extracted.subjects;
        if subjects.is_empty() {
            warn!("No inductee qualifies as a treatment subject");
            return Ok(MatchedCohort::new(subjects, Vec::new(), stats));
        }

        let treatment_ids: FxHashSet<&str> =
            subjects.iter().map(|s| s.subject_id.as_str()).collect();
        let pool = ControlPool::new(records, statuses, &treatment_ids, criteria);
        info!(
            "Matching {} treatment subjects with control pool of {} candidates across {} birth years",
            subjects.len(),
            pool.len(),
            pool.birth_year_count()
        );

        if criteria.unknown_death_policy == UnknownDeathPolicy::Exclude {
            let birth_years: FxHashSet<i32> = subjects.iter().map(|s| s.birth_year).collect();
            stats.indeterminate_candidates = birth_years
                .iter()
                .flat_map(|year| pool.cohort(*year))
                .filter(|&&candidate| pool.statuses[candidate] == LifeStatus::Indeterminate)
                .count();
            if stats.indeterminate_candidates > 0 {
                info!(
                    "{} same-birth-year candidates have indeterminate life status and are not used",
                    stats.indeterminate_candidates
                );
            }
        }

        let pb = if subjects.len() >= Self::PARALLEL_THRESHOLD {
            progress::create_main_progress_bar(subjects.len() as u64, Some("Matching treatment subjects"))
        } else {
            progress::hidden()
        };

        let use_parallel =
            self.config.use_parallel && subjects.len() >= Self::PARALLEL_THRESHOLD;
        let results = if use_parallel {
            perform_parallel_matching(&subjects, &pool, &self.config, &pb)
        } else {
            perform_sequential_matching(&subjects, &pool, &self.config, &pb)
        };
        progress::finish_and_clear(&pb);

        let mut pairs = Vec::with_capacity(results.iter().map(|r| r.pairs.len()).sum());
        for matches in results {
            stats.rejected_not_alive += matches.rejected_not_alive;
            stats.dropped_by_cap += matches.dropped_by_cap;
            pairs.extend(matches.pairs);
        }

        let cohort = MatchedCohort::new(subjects, pairs, stats);
        let unmatched = cohort.stats().treatments - cohort.stats().matched_treatments;
        if unmatched > 0 {
            warn!("{unmatched} treatment subjects have no eligible control");
        }

        let elapsed = start_time.elapsed();
        info!(
            "Matching complete: {} treatment subjects matched with {} distinct controls ({} pairs) in {:.2?}",
            cohort.stats().matched_treatments,
            cohort.stats().distinct_controls,
            cohort.stats().pairs,
            elapsed
        );

        Ok(cohort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::matching::criteria::MatchingCriteria;
    use crate::models::{HallOfFame, IndexBoundary, ResolvedDate};

    fn person(id: &str, birth: i32) -> BiographicalRecord {
        let mut record = BiographicalRecord::new(id);
        record.birth_date = ResolvedDate::from_parts(birth, Some(4), Some(2));
        record
    }

    fn inductee(id: &str, birth: i32, inducted: i32) -> BiographicalRecord {
        let mut record = person(id, birth);
        record.hall_of_fame = HallOfFame::In;
        record.induction_year = Some(inducted);
        record
    }

    /// A 1904 inductee of 1967 and four same-year candidates
    fn fixture() -> (Vec<BiographicalRecord>, Vec<LifeStatus>) {
        let records = vec![
            inductee("hof", 1904, 1967),
            person("died1970", 1904),
            person("died1967", 1904),
            person("died1950", 1904),
            person("unknown", 1904),
            person("other_year", 1905),
        ];
        let statuses = vec![
            LifeStatus::Deceased { year: 1985 },
            LifeStatus::Deceased { year: 1970 },
            LifeStatus::Deceased { year: 1967 },
            LifeStatus::Deceased { year: 1950 },
            LifeStatus::Indeterminate,
            LifeStatus::Alive,
        ];
        (records, statuses)
    }

    fn control_ids(cohort: &MatchedCohort) -> Vec<&str> {
        cohort.pairs().iter().map(|p| p.control_id.as_str()).collect()
    }

    #[test]
    fn test_strict_boundary() {
        let (records, statuses) = fixture();
        let matcher = CohortMatcher::new(MatchingConfig::default());
        let cohort = matcher.match_cohort(&records, &statuses).unwrap();

        assert_eq!(control_ids(&cohort), vec!["died1970"]);
        let stats = cohort.stats();
        assert_eq!(stats.treatments, 1);
        assert_eq!(stats.rejected_not_alive, 2);
        assert_eq!(stats.indeterminate_candidates, 1);
        assert_eq!(cohort.pairs()[0].control_death_year, Some(1970));
    }

    #[test]
    fn test_inclusive_boundary_and_assume_alive() {
        let (records, statuses) = fixture();
        let criteria = MatchingCriteria::builder()
            .index_boundary(IndexBoundary::Inclusive)
            .unknown_death_policy(UnknownDeathPolicy::AssumeAlive)
            .build();
        let matcher = CohortMatcher::new(MatchingConfig::builder().criteria(criteria).build());
        let cohort = matcher.match_cohort(&records, &statuses).unwrap();

        assert_eq!(control_ids(&cohort), vec!["died1970", "died1967", "unknown"]);
        assert_eq!(cohort.stats().indeterminate_candidates, 0);
    }

    #[test]
    fn test_treatments_are_never_controls() {
        let records = vec![
            inductee("early", 1904, 1950),
            inductee("late", 1904, 1967),
            person("plain", 1904),
        ];
        let statuses = vec![LifeStatus::Alive; 3];
        let cohort = CohortMatcher::new(MatchingConfig::default())
            .match_cohort(&records, &statuses)
            .unwrap();

        assert_eq!(cohort.stats().treatments, 2);
        for pair in cohort.pairs() {
            assert!(!cohort.is_treatment(&pair.control_id));
        }
        assert_eq!(cohort.match_count("plain"), 2);
        assert_eq!(cohort.control_view().len(), 1);
    }

    #[test]
    fn test_posthumous_inductee_is_a_control_unless_excluded() {
        let records = vec![
            inductee("living", 1904, 1967),
            inductee("early", 1904, 1960),
            person("plain", 1904),
        ];
        let statuses = vec![
            LifeStatus::Alive,
            LifeStatus::Deceased { year: 1975 },
            LifeStatus::Alive,
        ];
        let cohort = CohortMatcher::new(MatchingConfig::default())
            .match_cohort(&records, &statuses)
            .unwrap();
        assert_eq!(cohort.stats().treatments, 2);

        let statuses = vec![
            LifeStatus::Alive,
            LifeStatus::Deceased { year: 1970 },
            LifeStatus::Alive,
        ];
        let records = vec![
            inductee("living", 1904, 1967),
            inductee("posthumous", 1904, 1975),
            person("plain", 1904),
        ];
        let cohort = CohortMatcher::new(MatchingConfig::default())
            .match_cohort(&records, &statuses)
            .unwrap();
        assert_eq!(control_ids(&cohort), vec!["posthumous", "plain"]);

        let criteria = MatchingCriteria::builder().exclude_all_inductees(true).build();
        let cohort = CohortMatcher::new(MatchingConfig::builder().criteria(criteria).build())
            .match_cohort(&records, &statuses)
            .unwrap();
        assert_eq!(control_ids(&cohort), vec!["plain"]);
    }

    #[test]
    fn test_unmatched_treatment_is_reported() {
        let records = vec![inductee("lonely", 1890, 1939), person("younger", 1891)];
        let statuses = vec![LifeStatus::Deceased { year: 1950 }, LifeStatus::Alive];
        let cohort = CohortMatcher::new(MatchingConfig::default())
            .match_cohort(&records, &statuses)
            .unwrap();
        assert!(cohort.pairs().is_empty());
        assert_eq!(cohort.unmatched().count(), 1);
    }

    #[test]
    fn test_no_treatments_gives_empty_cohort() {
        let records = vec![person("a", 1900), person("b", 1900)];
        let statuses = vec![LifeStatus::Alive; 2];
        let cohort = CohortMatcher::new(MatchingConfig::default())
            .match_cohort(&records, &statuses)
            .unwrap();
        assert!(cohort.treatments().is_empty());
        assert!(cohort.pairs().is_empty());
    }

    #[test]
    fn test_seeded_cap_is_reproducible() {
        let mut records = vec![inductee("hof", 1904, 1967)];
        records.extend((0..40).map(|i| person(&format!("c{i:02}"), 1904)));
        let statuses = vec![LifeStatus::Alive; records.len()];
        let config = MatchingConfig::builder()
            .max_controls_per_treatment(5)
            .random_seed(42)
            .build();

        let first = CohortMatcher::new(config.clone()).match_cohort(&records, &statuses).unwrap();
        let second = CohortMatcher::new(config).match_cohort(&records, &statuses).unwrap();
        assert_eq!(first.pairs().len(), 5);
        assert_eq!(first.pairs(), second.pairs());
        assert_eq!(first.stats().dropped_by_cap, 35);
    }

    #[test]
    fn test_parallel_equals_sequential() {
        let mut records = Vec::new();
        for year in 1900..1910 {
            records.push(inductee(&format!("hof{year}a"), year, 1960));
            records.push(inductee(&format!("hof{year}b"), year, 1970));
            records.extend((0..12).map(|i| person(&format!("c{year}_{i}"), year)));
        }
        let statuses: Vec<_> = (0..records.len())
            .map(|i| LifeStatus::Deceased { year: 1955 + (i as i32 % 25) })
            .collect();
        let config = MatchingConfig::builder()
            .max_controls_per_treatment(3)
            .random_seed(7)
            .build();

        let extracted = extract_treatments(&records, &statuses, &config.criteria);
        let ids: FxHashSet<&str> = extracted
            .subjects
            .iter()
            .map(|s| s.subject_id.as_str())
            .collect();
        let pool = ControlPool::new(&records, &statuses, &ids, &config.criteria);
        let pb = progress::hidden();

        let sequential = perform_sequential_matching(&extracted.subjects, &pool, &config, &pb);
        let parallel = perform_parallel_matching(&extracted.subjects, &pool, &config, &pb);
        assert_eq!(sequential, parallel);
    }
}
