use std::fs;

use hof_longevity::algorithm::matching::TreatmentExclusion;
use hof_longevity::models::{EventStatus, RecordField};
use hof_longevity::pipeline::{Pipeline, PipelineOutput, file_names};
use hof_longevity::source::InputPaths;
use hof_longevity::utils::io::{TableFormat, read_parquet};
use hof_longevity::{MatchingConfig, MatchingCriteria, PipelineConfig};

use crate::utils::{temp_dir, write_hall_of_fame, write_people};

fn run_fixture(name: &str, config: PipelineConfig) -> (std::path::PathBuf, PipelineOutput) {
    let dir = temp_dir(name);
    let people = write_people(&dir);
    let hall_of_fame = write_hall_of_fame(&dir);
    let inputs = InputPaths::new(people).with_hall_of_fame(hall_of_fame);
    let output = Pipeline::new(config).unwrap().run(&inputs).unwrap();
    (dir, output)
}

fn record_index(output: &PipelineOutput, id: &str) -> usize {
    output
        .records
        .iter()
        .position(|r| r.subject_id == id)
        .unwrap()
}

#[test]
fn test_pipeline_stages() {
    let (_, output) = run_fixture("pipeline_stages", PipelineConfig::default());

    let audit = &output.audit;
    assert_eq!(audit.load.rows_without_id, 1);
    assert_eq!(audit.normalization.records_out, 10);
    assert_eq!(audit.normalization.field_failures.get(&RecordField::Height), Some(&1));

    let e2e1900 = &output.observations[record_index(&output, "e2e1900")].lifetime;
    assert_eq!(e2e1900.status, EventStatus::Observed);
    assert!((e2e1900.duration.unwrap() - 74.51).abs() < 0.005);
    let e2e1850 = &output.observations[record_index(&output, "e2e1850")].lifetime;
    assert_eq!(e2e1850.status, EventStatus::Unknown);

    let cohort = &output.cohort;
    let stats = cohort.stats();
    assert_eq!(stats.inductees, 3);
    assert_eq!(stats.treatments, 2);
    assert_eq!(stats.treatment_exclusions[&TreatmentExclusion::Posthumous], 1);
    assert_eq!(stats.pairs, 3);
    assert_eq!(stats.distinct_controls, 2);
    assert_eq!(cohort.match_count("ctrl1975"), 2);
    assert_eq!(cohort.match_count("ctrl1970"), 1);
    assert_eq!(cohort.match_count("ctrl1967"), 0);

    let lifetime_out = output.survival.summary.get("lifetime", 0).unwrap();
    assert_eq!(
        (lifetime_out.observed, lifetime_out.censored, lifetime_out.excluded),
        (4, 1, 2)
    );
    let lifetime_in = output.survival.summary.get("lifetime", 1).unwrap();
    assert_eq!(lifetime_in.observed, 3);
    assert!(output.survival.rows.iter().all(|r| r.duration > 0.0));

    assert_eq!(output.matched.rows.len(), 5);
    assert_eq!(output.matched.report.unmatched_treatments, 0);
    let hof = &output.matched.rows[0];
    assert_eq!((hof.subject_id.as_str(), hof.group, hof.event), ("hof1904", 1, 1));
    assert!((hof.duration - 13.0).abs() < 1e-9);
}

#[test]
fn test_inclusive_boundary_widens_cohort() {
    let criteria = MatchingCriteria::builder()
        .index_boundary(hof_longevity::IndexBoundary::Inclusive)
        .build();
    let config = PipelineConfig::builder()
        .matching(MatchingConfig::builder().criteria(criteria).build())
        .build()
        .unwrap();
    let (_, output) = run_fixture("pipeline_inclusive", config);

    assert_eq!(output.cohort.stats().pairs, 5);
    assert_eq!(output.cohort.match_count("ctrl1967"), 1);
    assert_eq!(output.cohort.match_count("ctrl1970"), 2);
}

#[test]
fn test_write_csv_outputs() {
    let (dir, output) = run_fixture("pipeline_csv", PipelineConfig::default());
    let out_dir = dir.join("out");
    let written = output.write_all(&out_dir, TableFormat::Csv).unwrap();
    assert_eq!(written.len(), 8);
    assert!(written.iter().all(|path| path.exists()));

    let pairs = fs::read_to_string(out_dir.join(format!("{}.csv", file_names::PAIRS))).unwrap();
    let mut lines = pairs.lines();
    assert_eq!(
        lines.next(),
        Some("treatment_id,control_id,birth_year,index_year,control_death_year")
    );
    assert_eq!(lines.count(), 3);

    let audit = fs::read_to_string(out_dir.join(format!("{}.json", file_names::AUDIT))).unwrap();
    let audit: serde_json::Value = serde_json::from_str(&audit).unwrap();
    assert_eq!(audit["matching"]["pairs"], 3);
    assert_eq!(audit["as_of_date"], "2021-12-02");
}

#[test]
fn test_write_parquet_outputs() {
    let (dir, output) = run_fixture("pipeline_parquet", PipelineConfig::default());
    let out_dir = dir.join("out");
    output.write_all(&out_dir, TableFormat::Parquet).unwrap();

    let path = out_dir.join(format!("{}.parquet", file_names::SURVIVAL));
    let batches = read_parquet(&path, 1024).unwrap();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, output.survival.rows.len());

    let controls = out_dir.join(format!("{}.parquet", file_names::CONTROLS));
    let batches = read_parquet(&controls, 1024).unwrap();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
}
