//! Common domain type definitions
//!
//! Small enums and value types shared by the records, the duration
//! calculator and the cohort matcher.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Batting or throwing hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Handedness {
    /// Left-handed
    Left,
    /// Right-handed
    Right,
    /// Both sides (switch hitter or ambidextrous thrower)
    Both,
    /// Not recorded
    #[default]
    Unknown,
}

impl Handedness {
    /// Single-letter code used in the source tables
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
            Self::Both => "B",
            Self::Unknown => "",
        }
    }
}

impl From<&str> for Handedness {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "l" | "left" => Self::Left,
            "r" | "right" => Self::Right,
            "b" | "s" | "both" | "switch" => Self::Both,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Both => "Both",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Hall of Fame membership, the strata under study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HallOfFame {
    /// Inducted
    In,
    /// Not inducted
    #[default]
    Out,
}

impl HallOfFame {
    /// Numeric group indicator for model input (1 = inducted)
    #[must_use]
    pub const fn indicator(self) -> u8 {
        match self {
            Self::In => 1,
            Self::Out => 0,
        }
    }

    /// Whether the subject is an inductee
    #[must_use]
    pub const fn is_in(self) -> bool {
        matches!(self, Self::In)
    }
}

impl From<&str> for HallOfFame {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" | "hof" | "in" | "1" | "true" => Self::In,
            _ => Self::Out,
        }
    }
}

impl fmt::Display for HallOfFame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("In"),
            Self::Out => f.write_str("Out"),
        }
    }
}

/// Granularity a date was recorded at in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatePrecision {
    /// Only the year is known
    Year,
    /// Year and month are known
    Month,
    /// Fully specified
    Day,
}

/// A calendar date resolved from a possibly partial source value
///
/// Partial values are imputed deterministically: a bare year resolves to
/// June 30 and a year-month resolves to the 15th. The precision is kept so
/// the record can be rendered back to the same partial form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedDate {
    /// The resolved (possibly imputed) calendar date
    pub date: NaiveDate,
    /// Precision of the source value
    pub precision: DatePrecision,
}

/// Month used when only the year is known
pub const IMPUTED_MONTH: u32 = 6;
/// Day used when only the year is known
pub const IMPUTED_DAY_OF_YEAR_ONLY: u32 = 30;
/// Day used when the day of month is missing
pub const IMPUTED_DAY_OF_MONTH: u32 = 15;

impl ResolvedDate {
    /// A fully specified date
    #[must_use]
    pub const fn exact(date: NaiveDate) -> Self {
        Self {
            date,
            precision: DatePrecision::Day,
        }
    }

    /// Resolve a date from its known components
    ///
    /// Returns `None` when the components do not form a valid calendar date.
    #[must_use]
    pub fn from_parts(year: i32, month: Option<u32>, day: Option<u32>) -> Option<Self> {
        match (month, day) {
            (Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day).map(Self::exact),
            (Some(month), None) => {
                NaiveDate::from_ymd_opt(year, month, IMPUTED_DAY_OF_MONTH).map(|date| Self {
                    date,
                    precision: DatePrecision::Month,
                })
            }
            (None, _) => {
                NaiveDate::from_ymd_opt(year, IMPUTED_MONTH, IMPUTED_DAY_OF_YEAR_ONLY).map(|date| {
                    Self {
                        date,
                        precision: DatePrecision::Year,
                    }
                })
            }
        }
    }

    /// Calendar year, which is always known regardless of precision
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Whether the day or month was imputed
    #[must_use]
    pub fn is_imputed(&self) -> bool {
        self.precision != DatePrecision::Day
    }

    /// Canonical text form at the recorded precision
    ///
    /// `1900`, `1900-06` or `1900-06-30`. Parsing this string yields the
    /// same `ResolvedDate`.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self.precision {
            DatePrecision::Year => format!("{:04}", self.date.year()),
            DatePrecision::Month => format!("{:04}-{:02}", self.date.year(), self.date.month()),
            DatePrecision::Day => self.date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// The three survival-relevant durations derived per subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationKind {
    /// Birth to death (or as-of date)
    Lifetime,
    /// Career start to career end
    Career,
    /// Birth to career end
    RetirementAge,
}

impl DurationKind {
    /// All kinds in emission order
    pub const ALL: [Self; 3] = [Self::Lifetime, Self::Career, Self::RetirementAge];

    /// Stable snake-case name used in output tables
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lifetime => "lifetime",
            Self::Career => "career",
            Self::RetirementAge => "retirement_age",
        }
    }
}

impl fmt::Display for DurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the terminating event of an observation was seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    /// The event (death or retirement) was observed
    Observed,
    /// The subject was still event-free at the as-of date
    Censored,
    /// Not enough information; must be excluded from modelling
    Unknown,
}

impl EventStatus {
    /// Model indicator: 1 for observed, 0 for censored, `None` when unknown
    #[must_use]
    pub const fn indicator(self) -> Option<u8> {
        match self {
            Self::Observed => Some(1),
            Self::Censored => Some(0),
            Self::Unknown => None,
        }
    }
}

/// Which comparison decides whether a subject survived to an index year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBoundary {
    /// Alive at index iff `death_year > index_year`
    #[default]
    Strict,
    /// Alive at index iff `death_year >= index_year`
    Inclusive,
}

impl IndexBoundary {
    /// Whether a subject who died in `death_year` counts as alive in `index_year`
    #[must_use]
    pub const fn survived(self, death_year: i32, index_year: i32) -> bool {
        match self {
            Self::Strict => death_year > index_year,
            Self::Inclusive => death_year >= index_year,
        }
    }
}

/// Life status of a subject as far as the data affirmatively supports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStatus {
    /// Death date is known
    Deceased {
        /// Year of death
        year: i32,
    },
    /// No death recorded, no death-context and plausibly alive at the as-of date
    Alive,
    /// Death may have occurred but is undated, or the subject is implausibly old
    Indeterminate,
}

impl LifeStatus {
    /// Whether the subject was alive in `index_year`
    ///
    /// `None` when the data cannot answer the question.
    #[must_use]
    pub const fn alive_in(self, index_year: i32, boundary: IndexBoundary) -> Option<bool> {
        match self {
            Self::Deceased { year } => Some(boundary.survived(year, index_year)),
            Self::Alive => Some(true),
            Self::Indeterminate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handedness_from_string() {
        assert_eq!(Handedness::from("L"), Handedness::Left);
        assert_eq!(Handedness::from(" r "), Handedness::Right);
        assert_eq!(Handedness::from("B"), Handedness::Both);
        assert_eq!(Handedness::from("S"), Handedness::Both);
        assert_eq!(Handedness::from("?"), Handedness::Unknown);
        assert_eq!(Handedness::from(""), Handedness::Unknown);
    }

    #[test]
    fn test_hall_of_fame_from_string() {
        assert_eq!(HallOfFame::from("HOF"), HallOfFame::In);
        assert_eq!(HallOfFame::from("Y"), HallOfFame::In);
        assert_eq!(HallOfFame::from("N"), HallOfFame::Out);
        assert_eq!(HallOfFame::from("NOT"), HallOfFame::Out);
    }

    #[test]
    fn test_resolved_date_imputation() {
        let year_only = ResolvedDate::from_parts(1900, None, None).unwrap();
        assert_eq!(year_only.date, NaiveDate::from_ymd_opt(1900, 6, 30).unwrap());
        assert_eq!(year_only.precision, DatePrecision::Year);
        assert_eq!(year_only.canonical(), "1900");

        let year_month = ResolvedDate::from_parts(1900, Some(2), None).unwrap();
        assert_eq!(year_month.date, NaiveDate::from_ymd_opt(1900, 2, 15).unwrap());
        assert_eq!(year_month.canonical(), "1900-02");

        assert!(ResolvedDate::from_parts(1900, Some(2), Some(30)).is_none());
    }

    #[test]
    fn test_index_boundary() {
        assert!(!IndexBoundary::Strict.survived(1967, 1967));
        assert!(IndexBoundary::Strict.survived(1968, 1967));
        assert!(IndexBoundary::Inclusive.survived(1967, 1967));
        assert!(!IndexBoundary::Inclusive.survived(1966, 1967));
    }

    #[test]
    fn test_life_status_alive_in() {
        let dead = LifeStatus::Deceased { year: 1970 };
        assert_eq!(dead.alive_in(1967, IndexBoundary::Strict), Some(true));
        assert_eq!(dead.alive_in(1970, IndexBoundary::Strict), Some(false));
        assert_eq!(LifeStatus::Alive.alive_in(1967, IndexBoundary::Strict), Some(true));
        assert_eq!(
            LifeStatus::Indeterminate.alive_in(1967, IndexBoundary::Strict),
            None
        );
    }
}
