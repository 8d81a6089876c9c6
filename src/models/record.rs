//! Biographical record models
//!
//! `RawRecord` is the string-typed row a source produces; `BiographicalRecord`
//! is the typed result of normalization. A typed record renders back to a
//! canonical raw row, which is what makes normalization a fixed point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LongevityError;
use crate::models::types::{HallOfFame, Handedness, IndexBoundary, LifeStatus, ResolvedDate};

/// Field names of a raw record
///
/// These are the keys of the correction table and of the per-field audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    SubjectId,
    NameFirst,
    NameLast,
    BirthDate,
    DeathDate,
    CareerStart,
    CareerEnd,
    Height,
    Weight,
    Bats,
    Throws,
    HallOfFame,
    InductionYear,
    BirthCity,
    BirthState,
    BirthCountry,
    DeathCity,
    DeathState,
    DeathCountry,
    Cemetery,
}

impl RecordField {
    /// Every field, in table order
    pub const ALL: [Self; 20] = [
        Self::SubjectId,
        Self::NameFirst,
        Self::NameLast,
        Self::BirthDate,
        Self::DeathDate,
        Self::CareerStart,
        Self::CareerEnd,
        Self::Height,
        Self::Weight,
        Self::Bats,
        Self::Throws,
        Self::HallOfFame,
        Self::InductionYear,
        Self::BirthCity,
        Self::BirthState,
        Self::BirthCountry,
        Self::DeathCity,
        Self::DeathState,
        Self::DeathCountry,
        Self::Cemetery,
    ];

    /// Snake-case name used in correction tables and audits
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SubjectId => "subject_id",
            Self::NameFirst => "name_first",
            Self::NameLast => "name_last",
            Self::BirthDate => "birth_date",
            Self::DeathDate => "death_date",
            Self::CareerStart => "career_start_date",
            Self::CareerEnd => "career_end_date",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Bats => "bats",
            Self::Throws => "throws",
            Self::HallOfFame => "hall_of_fame",
            Self::InductionYear => "induction_year",
            Self::BirthCity => "birth_city",
            Self::BirthState => "birth_state",
            Self::BirthCountry => "birth_country",
            Self::DeathCity => "death_city",
            Self::DeathState => "death_state",
            Self::DeathCountry => "death_country",
            Self::Cemetery => "cemetery",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = LongevityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| LongevityError::validation(format!("Unknown record field: {s}")))
    }
}

/// One string-typed row from a biographical source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub subject_id: String,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub career_start: Option<String>,
    pub career_end: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub hall_of_fame: Option<String>,
    pub induction_year: Option<String>,
    pub birth_city: Option<String>,
    pub birth_state: Option<String>,
    pub birth_country: Option<String>,
    pub death_city: Option<String>,
    pub death_state: Option<String>,
    pub death_country: Option<String>,
    pub cemetery: Option<String>,
}

impl RawRecord {
    /// Create an empty raw record for a subject
    #[must_use]
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..Self::default()
        }
    }

    /// Read a field as text
    #[must_use]
    pub fn get(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::SubjectId => Some(self.subject_id.as_str()),
            RecordField::NameFirst => self.name_first.as_deref(),
            RecordField::NameLast => self.name_last.as_deref(),
            RecordField::BirthDate => self.birth_date.as_deref(),
            RecordField::DeathDate => self.death_date.as_deref(),
            RecordField::CareerStart => self.career_start.as_deref(),
            RecordField::CareerEnd => self.career_end.as_deref(),
            RecordField::Height => self.height.as_deref(),
            RecordField::Weight => self.weight.as_deref(),
            RecordField::Bats => self.bats.as_deref(),
            RecordField::Throws => self.throws.as_deref(),
            RecordField::HallOfFame => self.hall_of_fame.as_deref(),
            RecordField::InductionYear => self.induction_year.as_deref(),
            RecordField::BirthCity => self.birth_city.as_deref(),
            RecordField::BirthState => self.birth_state.as_deref(),
            RecordField::BirthCountry => self.birth_country.as_deref(),
            RecordField::DeathCity => self.death_city.as_deref(),
            RecordField::DeathState => self.death_state.as_deref(),
            RecordField::DeathCountry => self.death_country.as_deref(),
            RecordField::Cemetery => self.cemetery.as_deref(),
        }
    }

    /// Overwrite a field; blank values clear it
    ///
    /// The subject id cannot be cleared, only replaced.
    pub fn set(&mut self, field: RecordField, value: Option<String>) {
        let value = value.and_then(|v| {
            let trimmed = v.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let slot = match field {
            RecordField::SubjectId => {
                if let Some(id) = value {
                    self.subject_id = id;
                }
                return;
            }
            RecordField::NameFirst => &mut self.name_first,
            RecordField::NameLast => &mut self.name_last,
            RecordField::BirthDate => &mut self.birth_date,
            RecordField::DeathDate => &mut self.death_date,
            RecordField::CareerStart => &mut self.career_start,
            RecordField::CareerEnd => &mut self.career_end,
            RecordField::Height => &mut self.height,
            RecordField::Weight => &mut self.weight,
            RecordField::Bats => &mut self.bats,
            RecordField::Throws => &mut self.throws,
            RecordField::HallOfFame => &mut self.hall_of_fame,
            RecordField::InductionYear => &mut self.induction_year,
            RecordField::BirthCity => &mut self.birth_city,
            RecordField::BirthState => &mut self.birth_state,
            RecordField::BirthCountry => &mut self.birth_country,
            RecordField::DeathCity => &mut self.death_city,
            RecordField::DeathState => &mut self.death_state,
            RecordField::DeathCountry => &mut self.death_country,
            RecordField::Cemetery => &mut self.cemetery,
        };
        *slot = value;
    }
}

/// Death and burial location fields
///
/// Any one of them being present is a weak signal that the subject has died,
/// even when no death date could be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathContext {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub cemetery: Option<String>,
}

impl DeathContext {
    /// Whether any death-context field is present
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.city.is_some() || self.state.is_some() || self.country.is_some() || self.cemetery.is_some()
    }
}

/// A normalized biographical record: one individual who appeared in a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiographicalRecord {
    /// Unique, stable key
    pub subject_id: String,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    /// Birth date; always needed for lifetime and age matching
    pub birth_date: Option<ResolvedDate>,
    /// Death date; absence means unknown, not alive
    pub death_date: Option<ResolvedDate>,
    /// First major league game
    pub career_start_date: Option<ResolvedDate>,
    /// Last major league game
    pub career_end_date: Option<ResolvedDate>,
    pub height_inches: Option<u32>,
    pub weight_pounds: Option<u32>,
    pub bats: Handedness,
    pub throws: Handedness,
    pub hall_of_fame: HallOfFame,
    /// Year of induction, when inducted and known
    pub induction_year: Option<i32>,
    pub birth_city: Option<String>,
    pub birth_state: Option<String>,
    pub birth_country: Option<String>,
    pub death_context: DeathContext,
}

impl BiographicalRecord {
    /// Create a record with only an identity; everything else unknown
    #[must_use]
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            name_first: None,
            name_last: None,
            birth_date: None,
            death_date: None,
            career_start_date: None,
            career_end_date: None,
            height_inches: None,
            weight_pounds: None,
            bats: Handedness::Unknown,
            throws: Handedness::Unknown,
            hall_of_fame: HallOfFame::Out,
            induction_year: None,
            birth_city: None,
            birth_state: None,
            birth_country: None,
            death_context: DeathContext::default(),
        }
    }

    /// Birth year, the age-matching key
    #[must_use]
    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.map(|d| d.year())
    }

    /// Death year, if a death date is known
    #[must_use]
    pub fn death_year(&self) -> Option<i32> {
        self.death_date.map(|d| d.year())
    }

    /// Whether any death or burial location is recorded
    #[must_use]
    pub fn has_death_context(&self) -> bool {
        self.death_context.is_present()
    }

    /// Body-mass index from pounds and inches; `None` if either is missing
    #[must_use]
    pub fn body_mass_index(&self) -> Option<f64> {
        match (self.weight_pounds, self.height_inches) {
            (Some(weight), Some(height)) if height > 0 => {
                let height = f64::from(height);
                Some(f64::from(weight) / (height * height) * 703.0)
            }
            _ => None,
        }
    }

    /// Number of calendar years from debut to final game, inclusive
    #[must_use]
    pub fn seasons(&self) -> Option<u32> {
        let start = self.career_start_date?.year();
        let end = self.career_end_date?.year();
        u32::try_from(end - start + 1).ok()
    }

    /// Whether the subject was alive when inducted
    ///
    /// `None` when the subject is not an inductee with a known induction year,
    /// or when the life status cannot answer the question.
    #[must_use]
    pub fn inducted_while_alive(&self, status: LifeStatus, boundary: IndexBoundary) -> Option<bool> {
        if !self.hall_of_fame.is_in() {
            return None;
        }
        let index_year = self.induction_year?;
        status.alive_in(index_year, boundary)
    }

    /// Render back to the canonical raw form
    ///
    /// Dates keep their recorded precision and height is written as `F-I`.
    #[must_use]
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            subject_id: self.subject_id.clone(),
            name_first: self.name_first.clone(),
            name_last: self.name_last.clone(),
            birth_date: self.birth_date.map(|d| d.canonical()),
            death_date: self.death_date.map(|d| d.canonical()),
            career_start: self.career_start_date.map(|d| d.canonical()),
            career_end: self.career_end_date.map(|d| d.canonical()),
            height: self.height_inches.map(|h| format!("{}-{}", h / 12, h % 12)),
            weight: self.weight_pounds.map(|w| w.to_string()),
            bats: Some(self.bats.code().to_string()).filter(|s| !s.is_empty()),
            throws: Some(self.throws.code().to_string()).filter(|s| !s.is_empty()),
            hall_of_fame: Some(if self.hall_of_fame.is_in() { "Y" } else { "N" }.to_string()),
            induction_year: self.induction_year.map(|y| y.to_string()),
            birth_city: self.birth_city.clone(),
            birth_state: self.birth_state.clone(),
            birth_country: self.birth_country.clone(),
            death_city: self.death_context.city.clone(),
            death_state: self.death_context.state.clone(),
            death_country: self.death_context.country.clone(),
            cemetery: self.death_context.cemetery.clone(),
        }
    }
}
