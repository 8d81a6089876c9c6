//! Retrosheet biofile
//!
//! One row per person with dates as `M/D/YYYY` (missing parts blank),
//! height as `F-I` and a `HOF` flag. Column names are matched ignoring case,
//! and the dotted names of the published file are accepted alongside the
//! lowercase names of newer releases.

use arrow::array::StringArray;
use arrow::record_batch::RecordBatch;

use crate::error::{LongevityError, Result};
use crate::models::{RawRecord, RecordField};
use crate::source::{BiographicalSource, SourceExtract, SourceLoader};
use crate::utils::arrow::{find_string_column, optional_value, string_value};

/// Column names accepted for each raw field
const COLUMNS: &[(RecordField, &[&str])] = &[
    (RecordField::NameFirst, &["FIRST", "firstname"]),
    (RecordField::NameLast, &["LAST", "lastname"]),
    (RecordField::BirthDate, &["BIRTHDATE"]),
    (RecordField::DeathDate, &["DEATHDATE"]),
    (RecordField::CareerStart, &["PLAY.DEBUT", "play_debut", "debut_p"]),
    (RecordField::CareerEnd, &["PLAY.LASTGAME", "play_lastgame", "last_p"]),
    (RecordField::Height, &["HEIGHT"]),
    (RecordField::Weight, &["WEIGHT"]),
    (RecordField::Bats, &["BATS"]),
    (RecordField::Throws, &["THROWS"]),
    (RecordField::HallOfFame, &["HOF"]),
    (RecordField::BirthCity, &["BIRTH.CITY", "birthcity"]),
    (RecordField::BirthState, &["BIRTH.STATE", "birthstate"]),
    (RecordField::BirthCountry, &["BIRTH.COUNTRY", "birthcountry"]),
    (RecordField::DeathCity, &["DEATH.CITY", "deathcity"]),
    (RecordField::DeathState, &["DEATH.STATE", "deathstate"]),
    (RecordField::DeathCountry, &["DEATH.COUNTRY", "deathcountry"]),
    (RecordField::Cemetery, &["CEMETERY"]),
];

const ID_COLUMNS: &[&str] = &["PLAYERID", "id"];

/// Loader for the Retrosheet biofile
#[derive(Debug, Clone, Copy, Default)]
pub struct BiofileSource;

impl SourceLoader for BiofileSource {
    fn source_name(&self) -> &'static str {
        "biofile"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["BIRTHDATE", "DEATHDATE"]
    }
}

impl BiographicalSource for BiofileSource {
    fn to_raw_records(&self, batches: &[RecordBatch]) -> Result<SourceExtract> {
        let mut extract = SourceExtract::default();
        for batch in batches {
            let ids = find_string_column(batch, ID_COLUMNS)?.ok_or_else(|| {
                LongevityError::schema("biofile table has no PLAYERID or id column")
            })?;
            let mut columns: Vec<(RecordField, Option<&StringArray>)> =
                Vec::with_capacity(COLUMNS.len());
            for (field, names) in COLUMNS {
                columns.push((*field, find_string_column(batch, names)?));
            }

            for row in 0..batch.num_rows() {
                let record = string_value(ids, row).map(|id| {
                    let mut raw = RawRecord::new(id);
                    for (field, column) in &columns {
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
