use hof_longevity::models::{DatePrecision, HallOfFame, Handedness, RawRecord, RecordField};
use hof_longevity::normalize::{Correction, CorrectionTable, Normalizer};
use hof_longevity::PipelineConfig;

use crate::utils::ymd;

fn normalizer(corrections: CorrectionTable) -> Normalizer {
    Normalizer::new(&PipelineConfig::default(), corrections)
}

fn biofile_row(id: &str) -> RawRecord {
    let mut raw = RawRecord::new(id);
    raw.birth_date = Some("2/6/1895".to_string());
    raw.death_date = Some("8/16/1948".to_string());
    raw.career_start = Some("7/11/1914".to_string());
    raw.career_end = Some("5/30/1935".to_string());
    raw.height = Some("6-2".to_string());
    raw.weight = Some("215".to_string());
    raw.bats = Some("L".to_string());
    raw.throws = Some("L".to_string());
    raw.hall_of_fame = Some("HOF".to_string());
    raw.induction_year = Some("1936".to_string());
    raw.death_city = Some("New York".to_string());
    raw
}

#[test]
fn test_full_record() {
    let outcome = normalizer(CorrectionTable::new()).normalize(vec![biofile_row("ruthba01")]);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.issues.is_empty());

    let record = &outcome.records[0];
    assert_eq!(record.birth_date.map(|d| d.date), Some(ymd(1895, 2, 6)));
    assert_eq!(record.height_inches, Some(74));
    assert_eq!(record.bats, Handedness::Left);
    assert_eq!(record.hall_of_fame, HallOfFame::In);
    assert_eq!(record.induction_year, Some(1936));
    assert!(record.has_death_context());
    assert_eq!(record.seasons(), Some(22));
}

#[test]
fn test_height_plausibility() {
    let cases = [("6-2", Some(74)), ("7-11", None), ("8-1", None), ("", None)];
    let raws: Vec<RawRecord> = cases
        .iter()
        .enumerate()
        .map(|(i, (height, _))| {
            let mut raw = RawRecord::new(format!("p{i}"));
            raw.height = Some((*height).to_string());
            raw
        })
        .collect();
    let outcome = normalizer(CorrectionTable::new()).normalize(raws);

    for (record, (height, expected)) in outcome.records.iter().zip(cases) {
        assert_eq!(record.height_inches, expected, "height {height:?}");
    }
    // The blank height is missing data, not a failure.
    assert_eq!(outcome.audit.field_failures.get(&RecordField::Height), Some(&2));
}

#[test]
fn test_partial_dates_are_imputed() {
    let mut raw = RawRecord::new("oldtimer");
    raw.birth_date = Some("/ /1850".to_string());
    raw.death_date = Some("7/ /1920".to_string());
    let outcome = normalizer(CorrectionTable::new()).normalize(vec![raw]);

    let record = &outcome.records[0];
    let birth = record.birth_date.unwrap();
    assert_eq!(birth.date, ymd(1850, 6, 30));
    assert_eq!(birth.precision, DatePrecision::Year);
    assert_eq!(record.death_date.unwrap().date, ymd(1920, 7, 15));
    assert_eq!(outcome.audit.imputed_dates.get(&RecordField::BirthDate), Some(&1));
}

#[test]
fn test_corrections_fix_known_errors() {
    let corrections = CorrectionTable::from_corrections([
        Correction::set("ruthba01", RecordField::Height, "6-1").with_note("listed height"),
        Correction::set("typo01", RecordField::BirthDate, "1901-04-30"),
    ])
    .unwrap();

    let mut typo = RawRecord::new("typo01");
    typo.birth_date = Some("4/31/1901".to_string());
    let outcome = normalizer(corrections).normalize(vec![biofile_row("ruthba01"), typo]);

    assert_eq!(outcome.records[0].height_inches, Some(73));
    assert_eq!(outcome.records[1].birth_date.map(|d| d.date), Some(ymd(1901, 4, 30)));
    assert_eq!(outcome.audit.corrections_applied, 2);
    assert!(outcome.issues.is_empty());
}

#[test]
fn test_normalization_is_a_fixed_point() {
    let mut partial = RawRecord::new("partial");
    partial.birth_date = Some("1850".to_string());
    partial.career_start = Some("04/00/1871".to_string());
    partial.height = Some("72".to_string());
    let mut broken = RawRecord::new("broken");
    broken.birth_date = Some("13/45/1900".to_string());
    broken.height = Some("8-1".to_string());

    let normalizer = normalizer(CorrectionTable::new());
    let first = normalizer.normalize(vec![biofile_row("ruthba01"), partial, broken]);
    let canonical: Vec<RawRecord> = first.records.iter().map(|r| r.to_raw()).collect();
    let second = normalizer.normalize(canonical);

    assert_eq!(first.records, second.records);
    assert!(second.issues.is_empty());
}

#[test]
fn test_duplicate_subjects_keep_first_row() {
    let mut later = biofile_row("ruthba01");
    later.height = Some("5-9".to_string());
    let outcome = normalizer(CorrectionTable::new()).normalize(vec![biofile_row("ruthba01"), later]);

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].height_inches, Some(74));
    assert_eq!(outcome.audit.duplicate_subject_ids, 1);
}
