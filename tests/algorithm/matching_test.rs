use hof_longevity::algorithm::duration::DurationCalculator;
use hof_longevity::algorithm::matching::{
    CohortMatcher, MatchedCohort, MatchingConfig, MatchingCriteria, TreatmentExclusion,
    UnknownDeathPolicy,
};
use hof_longevity::models::{BiographicalRecord, IndexBoundary, LifeStatus};
use hof_longevity::PipelineConfig;

use crate::utils::{inductee, person, ymd};

fn statuses(records: &[BiographicalRecord]) -> Vec<LifeStatus> {
    let calculator = DurationCalculator::new(&PipelineConfig::default());
    records.iter().map(|r| calculator.life_status(r)).collect()
}

fn match_with(records: &[BiographicalRecord], criteria: MatchingCriteria) -> MatchedCohort {
    let config = MatchingConfig::builder().criteria(criteria).build();
    CohortMatcher::new(config)
        .match_cohort(records, &statuses(records))
        .unwrap()
}

fn controls_of<'a>(cohort: &'a MatchedCohort, treatment: &'a str) -> Vec<&'a str> {
    cohort
        .matched_set(treatment)
        .map(|p| p.control_id.as_str())
        .collect()
}

#[test]
fn test_shared_control_counted_once_in_control_view() {
    let records = vec![
        inductee("t1967", ymd(1904, 3, 1), Some(ymd(1985, 1, 1)), 1967),
        person("control", ymd(1904, 10, 10), Some(ymd(1990, 1, 1))),
        inductee("t1970", ymd(1904, 5, 5), Some(ymd(1988, 1, 1)), 1970),
    ];
    let cohort = match_with(&records, MatchingCriteria::default());

    assert_eq!(controls_of(&cohort, "t1967"), vec!["control"]);
    assert_eq!(controls_of(&cohort, "t1970"), vec!["control"]);
    assert_eq!(cohort.pairs().len(), 2);
    assert_eq!(cohort.control_view().len(), 1);
    assert_eq!(cohort.match_count("control"), 2);
}

#[test]
fn test_index_boundary_cases() {
    let records = vec![
        inductee("t", ymd(1904, 3, 1), Some(ymd(1985, 1, 1)), 1967),
        person("dies_in_index_year", ymd(1904, 4, 4), Some(ymd(1967, 11, 1))),
        person("dies_year_before", ymd(1904, 5, 5), Some(ymd(1966, 11, 1))),
        person("dies_year_after", ymd(1904, 6, 6), Some(ymd(1968, 1, 1))),
    ];

    let strict = match_with(&records, MatchingCriteria::default());
    assert_eq!(controls_of(&strict, "t"), vec!["dies_year_after"]);

    let inclusive = match_with(
        &records,
        MatchingCriteria::builder()
            .index_boundary(IndexBoundary::Inclusive)
            .build(),
    );
    assert_eq!(
        controls_of(&inclusive, "t"),
        vec!["dies_in_index_year", "dies_year_after"]
    );
}

#[test]
fn test_other_birth_years_never_match() {
    let records = vec![
        inductee("t", ymd(1904, 3, 1), Some(ymd(1985, 1, 1)), 1967),
        person("older", ymd(1903, 12, 31), Some(ymd(1990, 1, 1))),
        person("younger", ymd(1905, 1, 1), Some(ymd(1990, 1, 1))),
    ];
    let cohort = match_with(&records, MatchingCriteria::default());
    assert!(cohort.pairs().is_empty());
    assert_eq!(cohort.unmatched().count(), 1);
}

#[test]
fn test_unknown_death_is_not_alive() {
    let mut undated = person("undated", ymd(1950, 2, 2), None);
    undated.death_context.city = Some("Havana".to_string());
    let records = vec![
        inductee("t", ymd(1950, 1, 1), None, 2005),
        person("alive", ymd(1950, 3, 3), None),
        undated,
    ];

    let cohort = match_with(&records, MatchingCriteria::default());
    assert_eq!(controls_of(&cohort, "t"), vec!["alive"]);
    assert_eq!(cohort.stats().indeterminate_candidates, 1);

    let lenient = match_with(
        &records,
        MatchingCriteria::builder()
            .unknown_death_policy(UnknownDeathPolicy::AssumeAlive)
            .build(),
    );
    assert_eq!(controls_of(&lenient, "t"), vec!["alive", "undated"]);
}

#[test]
fn test_posthumous_and_undated_inductees_are_not_treatments() {
    let mut undated = inductee("undated", ymd(1890, 1, 1), None, 1950);
    undated.death_context.cemetery = Some("Green-Wood".to_string());
    let records = vec![
        inductee("posthumous", ymd(1890, 1, 1), Some(ymd(1940, 1, 1)), 1950),
        undated,
        person("control", ymd(1890, 1, 1), Some(ymd(1960, 1, 1))),
    ];
    let cohort = match_with(&records, MatchingCriteria::default());

    assert!(cohort.treatments().is_empty());
    let exclusions = &cohort.stats().treatment_exclusions;
    assert_eq!(exclusions[&TreatmentExclusion::Posthumous], 1);
    assert_eq!(exclusions[&TreatmentExclusion::Indeterminate], 1);
}

#[test]
fn test_no_treatment_appears_as_control() {
    let records = vec![
        inductee("a", ymd(1920, 1, 1), Some(ymd(2000, 1, 1)), 1970),
        inductee("b", ymd(1920, 2, 2), Some(ymd(2001, 1, 1)), 1975),
        inductee("c", ymd(1920, 3, 3), Some(ymd(2002, 1, 1)), 1980),
        person("x", ymd(1920, 4, 4), Some(ymd(2003, 1, 1))),
    ];
    let cohort = match_with(&records, MatchingCriteria::default());
    assert_eq!(cohort.pairs().len(), 3);
    for pair in cohort.pairs() {
        assert!(!cohort.is_treatment(&pair.control_id));
        assert_eq!(pair.control_id, "x");
    }
}
