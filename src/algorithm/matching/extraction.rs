//! Treatment subject extraction and grouping

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

use crate::algorithm::matching::criteria::MatchingCriteria;
use crate::algorithm::matching::types::{TreatmentExclusion, TreatmentSubject};
use crate::models::{BiographicalRecord, LifeStatus};

/// Treatment subjects together with the inductees left out
#[derive(Debug, Default)]
pub struct ExtractedTreatments {
    pub subjects: Vec<TreatmentSubject>,
    pub inductees: usize,
    pub exclusions: BTreeMap<TreatmentExclusion, usize>,
}

/// Select inductees confirmed alive at their induction year
///
/// Subjects appear in record order.
#[must_use]
pub fn extract_treatments(
    records: &[BiographicalRecord],
    statuses: &[LifeStatus],
    criteria: &MatchingCriteria,
) -> ExtractedTreatments {
    let mut extracted = ExtractedTreatments::default();

    for (index, (record, status)) in records.iter().zip(statuses).enumerate() {
        if !record.hall_of_fame.is_in() {
            continue;
        }
        extracted.inductees += 1;

        match classify(record, *status, criteria) {
            Ok((birth_year, index_year)) => {
                match TreatmentSubject::new(&record.subject_id, birth_year, index_year, index) {
                    Some(subject) => extracted.subjects.push(subject),
                    None => {
                        *extracted
                            .exclusions
                            .entry(TreatmentExclusion::NoIndexYear)
                            .or_insert(0) += 1;
                    }
                }
            }
            Err(reason) => {
                debug!("Inductee {} is not a treatment subject: {reason}", record.subject_id);
                *extracted.exclusions.entry(reason).or_insert(0) += 1;
            }
        }
    }

    extracted
}

fn classify(
    record: &BiographicalRecord,
    status: LifeStatus,
    criteria: &MatchingCriteria,
) -> Result<(i32, i32), TreatmentExclusion> {
    let index_year = record.induction_year.ok_or(TreatmentExclusion::NoIndexYear)?;
    let birth_year = record.birth_year().ok_or(TreatmentExclusion::NoBirthYear)?;
    match criteria.is_alive_at_index(status, index_year) {
        Some(true) => Ok((birth_year, index_year)),
        Some(false) => Err(TreatmentExclusion::Posthumous),
        None => Err(TreatmentExclusion::Indeterminate),
    }
}

/// Group treatment positions by birth year, ascending
///
/// Treatments in one group share a control cohort, which makes a group the
/// natural unit of parallel work.
#[must_use]
pub fn group_by_birth_year(subjects: &[TreatmentSubject]) -> Vec<(i32, Vec<usize>)> {
    subjects
        .iter()
        .enumerate()
        .map(|(position, subject)| (subject.birth_year, position))
        .into_group_map()
        .into_iter()
        .sorted_unstable_by_key(|(year, _)| *year)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HallOfFame, IndexBoundary, ResolvedDate};

    fn inductee(id: &str, birth: i32, inducted: Option<i32>) -> BiographicalRecord {
        let mut record = BiographicalRecord::new(id);
        record.birth_date = ResolvedDate::from_parts(birth, Some(5), Some(1));
        record.hall_of_fame = HallOfFame::In;
        record.induction_year = inducted;
        record
    }

    #[test]
    fn test_extract_treatments() {
        let records = vec![
            inductee("alive", 1904, Some(1967)),
            inductee("posthumous", 1904, Some(1967)),
            inductee("unknown", 1904, Some(1967)),
            inductee("noyear", 1904, None),
            BiographicalRecord::new("control"),
        ];
        let statuses = vec![
            LifeStatus::Deceased { year: 1980 },
            LifeStatus::Deceased { year: 1967 },
            LifeStatus::Indeterminate,
            LifeStatus::Alive,
            LifeStatus::Alive,
        ];
        let extracted = extract_treatments(&records, &statuses, &MatchingCriteria::default());

        assert_eq!(extracted.inductees, 4);
        assert_eq!(extracted.subjects.len(), 1);
        let subject = &extracted.subjects[0];
        assert_eq!(subject.subject_id, "alive");
        assert_eq!(subject.index_date.to_string(), "1967-06-30");
        assert_eq!(extracted.exclusions[&TreatmentExclusion::Posthumous], 1);
        assert_eq!(extracted.exclusions[&TreatmentExclusion::Indeterminate], 1);
        assert_eq!(extracted.exclusions[&TreatmentExclusion::NoIndexYear], 1);
    }

    #[test]
    fn test_inclusive_boundary_admits_death_in_index_year() {
        let records = vec![inductee("same_year", 1904, Some(1967))];
        let statuses = vec![LifeStatus::Deceased { year: 1967 }];
        let criteria = MatchingCriteria::builder()
            .index_boundary(IndexBoundary::Inclusive)
            .build();
        assert_eq!(extract_treatments(&records, &statuses, &criteria).subjects.len(), 1);
    }

    #[test]
    fn test_group_by_birth_year() {
        let subjects: Vec<_> = [(1910, 1970), (1904, 1967), (1910, 1975)]
            .iter()
            .enumerate()
            .filter_map(|(i, (b, y))| TreatmentSubject::new(&format!("s{i}"), *b, *y, i))
            .collect();
        let groups = group_by_birth_year(&subjects);
        assert_eq!(groups, vec![(1904, vec![1]), (1910, vec![0, 2])]);
    }
}
