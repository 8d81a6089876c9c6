//! Partial-date parsing with deterministic imputation.
//!
//! Source dates come at three granularities. A bare year resolves to June 30,
//! a year and month to the 15th, and a full date is used as-is. Missing
//! components may be blank or zero, as in Retrosheet's `/ /1850` or
//! `00/00/1850`.

use crate::models::ResolvedDate;
use crate::normalize::issue::ParseFailure;

/// Earliest year accepted in any date field
pub const MIN_YEAR: i32 = 1800;
/// Latest year accepted in any date field
pub const MAX_YEAR: i32 = 2100;

/// Parse a date string at whatever precision it carries
///
/// Returns `Ok(None)` for blank input, which is missing data rather than a
/// failure.
pub fn parse_partial_date(s: &str) -> Result<Option<ResolvedDate>, ParseFailure> {
    let s = s.trim().trim_matches('"').trim();
    if s.is_empty() {
        return Ok(None);
    }

    let (year, month, day) = if s.contains('/') {
        split_slashed(s)?
    } else if s.contains('-') {
        split_dashed(s)?
    } else if s.chars().all(|c| c.is_ascii_digit()) {
        split_compact(s)?
    } else {
        return Err(ParseFailure::Unrecognized(s.to_string()));
    };

    resolve(s, year, month, day).map(Some)
}

/// Assemble a date from separate year, month and day columns
///
/// This is the Lahman layout (`birthYear`, `birthMonth`, `birthDay`). A blank
/// year means the whole date is missing.
pub fn parse_date_parts(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
) -> Result<Option<ResolvedDate>, ParseFailure> {
    let Some(year_text) = year.map(str::trim).filter(|y| !y.is_empty()) else {
        return Ok(None);
    };
    let year = parse_year(year_text)?;
    let month = month.map(parse_component).transpose()?.flatten();
    let day = day.map(parse_component).transpose()?.flatten();
    let label = format!(
        "{year_text}/{}/{}",
        month.map_or(String::new(), |m| m.to_string()),
        day.map_or(String::new(), |d| d.to_string())
    );
    resolve(&label, year, month, day).map(Some)
}

/// Render a date as `YYYY[-MM[-DD]]` from optional components
///
/// Sources with split columns use this to produce the raw text the
/// normalizer parses.
#[must_use]
pub fn join_date_parts(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Option<String> {
    let year = year.map(str::trim).filter(|y| !y.is_empty())?;
    let month = month.map(str::trim).filter(|m| !m.is_empty() && !is_all_zero(m));
    let day = day.map(str::trim).filter(|d| !d.is_empty() && !is_all_zero(d));
    Some(match (month, day) {
        (Some(m), Some(d)) => format!("{year}-{m:0>2}-{d:0>2}"),
        (Some(m), None) => format!("{year}-{m:0>2}"),
        (None, _) => year.to_string(),
    })
}

/// Parse a four-digit year within the accepted window
pub fn parse_year(s: &str) -> Result<i32, ParseFailure> {
    let s = s.trim();
    let year: i32 = s
        .parse()
        .map_err(|_| ParseFailure::InvalidComponent(format!("year {s:?}")))?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ParseFailure::YearOutOfRange(year));
    }
    Ok(year)
}

/// `M/D/YYYY` or `M/YYYY`, with blank or zero components for missing parts
fn split_slashed(s: &str) -> Result<(i32, Option<u32>, Option<u32>), ParseFailure> {
    let parts: Vec<&str> = s.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [month, day, year] => Ok((
            parse_year(year)?,
            parse_component(month)?,
            parse_component(day)?,
        )),
        [month, year] => Ok((parse_year(year)?, parse_component(month)?, None)),
        _ => Err(ParseFailure::Unrecognized(s.to_string())),
    }
}

/// `YYYY-MM-DD` or `YYYY-MM`, with zero components for missing parts
fn split_dashed(s: &str) -> Result<(i32, Option<u32>, Option<u32>), ParseFailure> {
    let parts: Vec<&str> = s.split('-').map(str::trim).collect();
    match parts.as_slice() {
        [year, month, day] => Ok((
            parse_year(year)?,
            parse_component(month)?,
            parse_component(day)?,
        )),
        [year, month] => Ok((parse_year(year)?, parse_component(month)?, None)),
        _ => Err(ParseFailure::Unrecognized(s.to_string())),
    }
}

/// `YYYY`, `YYYYMM` or `YYYYMMDD`
fn split_compact(s: &str) -> Result<(i32, Option<u32>, Option<u32>), ParseFailure> {
    match s.len() {
        4 => Ok((parse_year(s)?, None, None)),
        6 => Ok((parse_year(&s[0..4])?, parse_component(&s[4..6])?, None)),
        8 => Ok((
            parse_year(&s[0..4])?,
            parse_component(&s[4..6])?,
            parse_component(&s[6..8])?,
        )),
        _ => Err(ParseFailure::Unrecognized(s.to_string())),
    }
}

/// A month or day component; blank or zero means missing
fn parse_component(s: &str) -> Result<Option<u32>, ParseFailure> {
    let s = s.trim();
    if s.is_empty() || is_all_zero(s) {
        return Ok(None);
    }
    s.parse::<u32>()
        .map(Some)
        .map_err(|_| ParseFailure::InvalidComponent(format!("{s:?}")))
}

fn is_all_zero(s: &str) -> bool {
    s.chars().all(|c| c == '0')
}

fn resolve(
    original: &str,
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
) -> Result<ResolvedDate, ParseFailure> {
    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            return Err(ParseFailure::InvalidComponent(format!("month {month}")));
        }
    }
    // A day without a month carries no usable information.
    let day = month.and(day);
    if let Some(day) = day {
        if !(1..=31).contains(&day) {
            return Err(ParseFailure::InvalidComponent(format!("day {day}")));
        }
    }
    ResolvedDate::from_parts(year, month, day)
        .ok_or_else(|| ParseFailure::InvalidDate(original.to_string()))
}
