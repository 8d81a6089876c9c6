use hof_longevity::algorithm::duration::{DurationCalculator, DurationSummary, fractional_years};
use hof_longevity::models::{
    DeathContext, DurationKind, EventStatus, LifeStatus, RawRecord, UnknownReason,
};
use hof_longevity::normalize::{CorrectionTable, Normalizer};
use hof_longevity::PipelineConfig;

use crate::utils::{person, ymd};

fn raw(id: &str, birth: &str, death: Option<&str>) -> RawRecord {
    let mut raw = RawRecord::new(id);
    raw.birth_date = Some(birth.to_string());
    raw.death_date = death.map(str::to_string);
    raw
}

#[test]
fn test_three_record_lifetimes() {
    let config = PipelineConfig::default();
    let outcome = Normalizer::new(&config, CorrectionTable::new()).normalize(vec![
        raw("died", "1900", Some("1975-01-01")),
        raw("living", "1920", None),
        raw("ancient", "1850", None),
    ]);
    let calculator = DurationCalculator::new(&config);
    let observations = calculator.observe_all(&outcome.records);

    let died = &observations[0].lifetime;
    assert_eq!(died.status, EventStatus::Observed);
    // 1900-06-30 to 1975-01-01: 74 years and 185 of 365 days
    assert!((died.duration.unwrap() - (74.0 + 185.0 / 365.0)).abs() < 1e-9);
    assert_eq!(format!("{:.2}", died.duration.unwrap()), "74.51");

    let living = &observations[1].lifetime;
    assert_eq!(living.status, EventStatus::Censored);
    // 1920-06-30 to 2021-12-02: 101 years and 155 of 365 days
    assert!((living.duration.unwrap() - (101.0 + 155.0 / 365.0)).abs() < 1e-9);
    assert_eq!(format!("{:.4}", living.duration.unwrap()), "101.4247");
    assert_eq!(calculator.life_status(&outcome.records[1]), LifeStatus::Alive);

    let ancient = &observations[2].lifetime;
    assert_eq!(ancient.status, EventStatus::Unknown);
    assert_eq!(ancient.duration, None);
    assert_eq!(ancient.unknown_reason, Some(UnknownReason::ExceedsCeiling));
    assert_eq!(calculator.life_status(&outcome.records[2]), LifeStatus::Indeterminate);

    let summary = DurationSummary::from_observations(&observations);
    let lifetime = &summary.kinds[&DurationKind::Lifetime];
    assert_eq!((lifetime.observed, lifetime.censored, lifetime.unknown_total()), (1, 1, 1));
    assert_eq!(summary.sanity_violations(), 1);
}

#[test]
fn test_known_death_is_exact_day_interval() {
    let record = person("p", ymd(1895, 2, 6), Some(ymd(1948, 8, 16)));
    let observation = DurationCalculator::new(&PipelineConfig::default()).lifetime(&record);
    assert_eq!(observation.status, EventStatus::Observed);
    assert_eq!(
        observation.duration,
        fractional_years(ymd(1895, 2, 6), ymd(1948, 8, 16))
    );
}

#[test]
fn test_death_context_without_date_is_unknown() {
    let mut record = person("p", ymd(1930, 1, 1), None);
    record.death_context = DeathContext {
        cemetery: Some("Woodlawn".to_string()),
        ..DeathContext::default()
    };
    let calculator = DurationCalculator::new(&PipelineConfig::default());
    let observation = calculator.lifetime(&record);
    assert_eq!(observation.status, EventStatus::Unknown);
    assert_eq!(observation.duration, None);
    assert_eq!(observation.unknown_reason, Some(UnknownReason::UndatedDeath));
    assert_eq!(calculator.life_status(&record), LifeStatus::Indeterminate);
}

#[test]
fn test_as_of_date_moves_censoring() {
    let record = person("p", ymd(1950, 6, 30), None);
    let earlier = PipelineConfig::builder()
        .as_of_date(ymd(2000, 6, 30))
        .build()
        .unwrap();
    let observation = DurationCalculator::new(&earlier).lifetime(&record);
    assert_eq!(observation.duration, Some(50.0));
    assert_eq!(observation.as_of_date, ymd(2000, 6, 30));
}

#[test]
fn test_career_and_retirement_age() {
    let mut record = person("p", ymd(1960, 1, 1), None);
    record.career_start_date = Some(hof_longevity::ResolvedDate::exact(ymd(1980, 4, 1)));
    record.career_end_date = Some(hof_longevity::ResolvedDate::exact(ymd(2021, 1, 1)));
    let calculator = DurationCalculator::new(&PipelineConfig::default());

    // Less than two years since the last game: still active.
    let career = calculator.career(&record);
    assert_eq!(career.status, EventStatus::Censored);
    assert!(career.duration.unwrap() > 40.0);

    record.career_end_date = Some(hof_longevity::ResolvedDate::exact(ymd(2000, 1, 1)));
    let retirement = calculator.retirement_age(&record);
    assert_eq!(retirement.status, EventStatus::Observed);
    assert_eq!(retirement.duration, Some(40.0));
}
