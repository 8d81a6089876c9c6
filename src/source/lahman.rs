//! Lahman baseball database: `People` and `HallOfFame`
//!
//! `People` splits each date into year, month and day columns; those are
//! joined into a partial-date string so the normalizer applies the same
//! imputation rules as for every other source. `HallOfFame` holds one row
//! per ballot; the inductions in it become an [`InductionTable`].

use arrow::array::StringArray;
use arrow::record_batch::RecordBatch;
use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{LongevityError, Result};
use crate::models::{RawRecord, RecordField};
use crate::normalize::date::{join_date_parts, parse_year};
use crate::source::{BiographicalSource, SourceExtract, SourceLoader};
use crate::utils::arrow::{find_string_column, optional_value, string_value};

/// Plain text columns copied straight into the raw record
const TEXT_COLUMNS: &[(RecordField, &str)] = &[
    (RecordField::NameFirst, "nameFirst"),
    (RecordField::NameLast, "nameLast"),
    (RecordField::Height, "height"),
    (RecordField::Weight, "weight"),
    (RecordField::Bats, "bats"),
    (RecordField::Throws, "throws"),
    (RecordField::BirthCity, "birthCity"),
    (RecordField::BirthState, "birthState"),
    (RecordField::BirthCountry, "birthCountry"),
    (RecordField::DeathCity, "deathCity"),
    (RecordField::DeathState, "deathState"),
    (RecordField::DeathCountry, "deathCountry"),
];

/// Loader for the Lahman `People` table (`Master` in older releases)
#[derive(Debug, Clone, Copy, Default)]
pub struct LahmanPeopleSource;

struct DateColumns<'a> {
    year: Option<&'a StringArray>,
    month: Option<&'a StringArray>,
    day: Option<&'a StringArray>,
}

impl<'a> DateColumns<'a> {
    fn find(batch: &'a RecordBatch, prefix: &str) -> Result<Self> {
        Ok(Self {
            year: find_string_column(batch, &[format!("{prefix}Year").as_str()])?,
            month: find_string_column(batch, &[format!("{prefix}Month").as_str()])?,
            day: find_string_column(batch, &[format!("{prefix}Day").as_str()])?,
        })
    }

    fn value(&self, row: usize) -> Option<String> {
        join_date_parts(
            optional_value(self.year, row).as_deref(),
            optional_value(self.month, row).as_deref(),
            optional_value(self.day, row).as_deref(),
        )
    }
}

/// Game dates may carry a time of day; only the date part is kept
fn date_only(value: Option<String>) -> Option<String> {
    value.and_then(|v| v.split([' ', 'T']).next().map(str::to_string))
}

impl SourceLoader for LahmanPeopleSource {
    fn source_name(&self) -> &'static str {
        "lahman"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["playerID", "birthYear", "deathYear"]
    }
}

impl BiographicalSource for LahmanPeopleSource {
    fn to_raw_records(&self, batches: &[RecordBatch]) -> Result<SourceExtract> {
        let mut extract = SourceExtract::default();
        for batch in batches {
            let ids = find_string_column(batch, &["playerID"])?
                .ok_or_else(|| LongevityError::schema("People table has no playerID column"))?;
            let birth = DateColumns::find(batch, "birth")?;
            let death = DateColumns::find(batch, "death")?;
            let debut = find_string_column(batch, &["debut"])?;
            let final_game = find_string_column(batch, &["finalGame"])?;
            let mut text = Vec::with_capacity(TEXT_COLUMNS.len());
            for (field, name) in TEXT_COLUMNS {
                text.push((*field, find_string_column(batch, &[*name])?));
            }

            for row in 0..batch.num_rows() {
                let record = string_value(ids, row).map(|id| {
                    let mut raw = RawRecord::new(id);
                    raw.birth_date = birth.value(row);
                    raw.death_date = death.value(row);
                    raw.career_start = date_only(optional_value(debut, row));
                    raw.career_end = date_only(optional_value(final_game, row));
                    for (field, column) in &text {
                        raw.set(*field, optional_value(*column, row));
                    }
                    raw
                });
                extract.push(record);
            }
        }
        Ok(extract)
    }
}

/// Loader for the Lahman `HallOfFame` table
#[derive(Debug, Clone, Copy, Default)]
pub struct HallOfFameSource;

impl SourceLoader for HallOfFameSource {
    fn source_name(&self) -> &'static str {
        "hall_of_fame"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["playerID", "yearid", "inducted"]
    }
}

/// Earliest induction year per subject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InductionTable {
    years: FxHashMap<String, i32>,
}

impl InductionTable {
    /// Build from `(subject id, year)` pairs, keeping the earliest year
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, i32)>) -> Self {
        let mut years: FxHashMap<String, i32> = FxHashMap::default();
        for (subject_id, year) in pairs {
            years
                .entry(subject_id)
                .and_modify(|existing| *existing = (*existing).min(year))
                .or_insert(year);
        }
        Self { years }
    }

    /// Build from `HallOfFame` batches
    ///
    /// Only rows with `inducted == Y` count. When `category` is given, rows
    /// with a different `category` are ignored; a table without that column
    /// is not filtered.
    pub fn from_batches(batches: &[RecordBatch], category: Option<&str>) -> Result<Self> {
        let mut pairs = Vec::new();
        for batch in batches {
            let ids = find_string_column(batch, &["playerID"])?
                .ok_or_else(|| LongevityError::schema("HallOfFame table has no playerID column"))?;
            let years = find_string_column(batch, &["yearid", "yearID"])?
                .ok_or_else(|| LongevityError::schema("HallOfFame table has no yearid column"))?;
            let inducted = find_string_column(batch, &["inducted"])?
                .ok_or_else(|| LongevityError::schema("HallOfFame table has no inducted column"))?;
            let categories = find_string_column(batch, &["category"])?;

            for row in 0..batch.num_rows() {
                let is_inducted = string_value(inducted, row)
                    .is_some_and(|v| v.eq_ignore_ascii_case("y"));
                if !is_inducted {
                    continue;
                }
                if let (Some(wanted), Some(column)) = (category, categories) {
                    let matches = string_value(column, row)
                        .is_some_and(|c| c.eq_ignore_ascii_case(wanted));
                    if !matches {
                        continue;
                    }
                }
                let Some(id) = string_value(ids, row) else {
                    continue;
                };
                match string_value(years, row).as_deref().map(parse_year) {
                    Some(Ok(year)) => pairs.push((id, year)),
                    Some(Err(failure)) => debug!("Ignoring induction of {id}: {failure}"),
                    None => debug!("Ignoring induction of {id}: no year"),
                }
            }
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Number of inducted subjects
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether no subject is inducted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Induction year of a subject
    #[must_use]
    pub fn year_for(&self, subject_id: &str) -> Option<i32> {
        self.years.get(subject_id).copied()
    }

    /// Mark the listed subjects as inducted, with their year
    ///
    /// Subjects not in the table are left as the source recorded them.
    /// Returns the number of records marked.
    pub fn apply(&self, records: &mut [RawRecord]) -> usize {
        let mut marked = 0;
        for raw in records.iter_mut() {
            if let Some(year) = self.year_for(&raw.subject_id) {
                raw.hall_of_fame = Some("Y".to_string());
                raw.induction_year = Some(year.to_string());
                marked += 1;
            }
        }
        marked
    }
}
