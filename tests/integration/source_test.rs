use hof_longevity::PipelineConfig;
use hof_longevity::source::{InputPaths, load_inputs, load_inputs_async, source_from_path};

use crate::utils::{PEOPLE_ROWS, temp_dir, write_file, write_hall_of_fame, write_people};

#[test]
fn test_load_lahman_tables() {
    let dir = temp_dir("source_lahman");
    let people = write_people(&dir);
    let hall_of_fame = write_hall_of_fame(&dir);
    let corrections = write_file(
        &dir,
        "corrections.csv",
        "subject_id,field,value,note\nctrl1975,height,65,height column shifted\n",
    );

    let inputs = InputPaths::new(&people)
        .with_hall_of_fame(&hall_of_fame)
        .with_corrections(&corrections);
    let loaded = load_inputs(&inputs, &PipelineConfig::default()).unwrap();

    assert_eq!(loaded.source_name, "lahman");
    assert_eq!(loaded.extract.rows_read, PEOPLE_ROWS.len());
    assert_eq!(loaded.extract.rows_without_id, 1);
    assert_eq!(loaded.extract.records.len(), PEOPLE_ROWS.len() - 1);
    assert_eq!(loaded.corrections.len(), 1);

    let inductions = loaded.inductions.unwrap();
    assert_eq!(inductions.len(), 3);
    assert_eq!(inductions.year_for("hof1904"), Some(1967));
    assert_eq!(inductions.year_for("ctrl1975"), None);

    let hof = &loaded.extract.records[0];
    assert_eq!(hof.subject_id, "hof1904");
    assert_eq!(hof.birth_date.as_deref(), Some("1904-03-01"));
    assert_eq!(hof.induction_year.as_deref(), Some("1967"));

    let partial = loaded
        .extract
        .records
        .iter()
        .find(|r| r.subject_id == "e2e1920")
        .unwrap();
    assert_eq!(partial.birth_date.as_deref(), Some("1920"));
    assert_eq!(partial.death_date, None);
}

#[tokio::test]
async fn test_async_load_matches_blocking_load() {
    let dir = temp_dir("source_async");
    let people = write_people(&dir);
    let hall_of_fame = write_hall_of_fame(&dir);
    let inputs = InputPaths::new(&people).with_hall_of_fame(&hall_of_fame);
    let config = PipelineConfig::default();

    let loaded = load_inputs_async(&inputs, &config).await.unwrap();
    assert_eq!(loaded.extract.records.len(), PEOPLE_ROWS.len() - 1);
    assert!(loaded.inductions.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_load_inside_multi_thread_runtime() {
    let dir = temp_dir("source_blocking_mt");
    let people = write_people(&dir);
    let inputs = InputPaths::new(&people);

    let loaded = load_inputs(&inputs, &PipelineConfig::default()).unwrap();
    assert_eq!(loaded.extract.records.len(), PEOPLE_ROWS.len() - 1);
}

#[tokio::test(flavor = "current_thread")]
async fn test_blocking_load_inside_current_thread_runtime() {
    let dir = temp_dir("source_blocking_ct");
    let people = write_people(&dir);
    let hall_of_fame = write_hall_of_fame(&dir);
    let inputs = InputPaths::new(&people).with_hall_of_fame(&hall_of_fame);

    let loaded = load_inputs(&inputs, &PipelineConfig::default()).unwrap();
    assert_eq!(loaded.extract.records.len(), PEOPLE_ROWS.len() - 1);
    assert_eq!(loaded.inductions.map(|t| t.len()), Some(3));
}

#[test]
fn test_missing_file_is_a_load_error() {
    let dir = temp_dir("source_missing");
    let inputs = InputPaths::new(dir.join("People.csv")).with_source("lahman");
    assert!(load_inputs(&inputs, &PipelineConfig::default()).is_err());
}

#[test]
fn test_source_detected_from_header() {
    let dir = temp_dir("source_detect");
    let path = write_file(
        &dir,
        "players.csv",
        "PLAYERID,LAST,FIRST,BIRTHDATE,DEATHDATE,HEIGHT,HOF\nruthba01,Ruth,Babe,2/6/1895,8/16/1948,6-2,HOF\n",
    );
    let source = source_from_path(&path, &PipelineConfig::default().source).unwrap();
    assert_eq!(source.source_name(), "biofile");
}
