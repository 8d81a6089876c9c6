//! Calendar interval in fractional years
//!
//! Whole years are counted by calendar anniversary. The remaining days are
//! divided by the number of days in the anniversary year that contains them,
//! so a year is always exactly one year whether or not it spans a Feb 29.

use chrono::{Datelike, Months, NaiveDate};

/// The anniversary of `start` after `years` whole years
///
/// A Feb 29 start falls back to Feb 28 in common years.
fn anniversary(start: NaiveDate, years: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Whole calendar years from `start` to `end`, and the anniversary reached
fn whole_years(start: NaiveDate, end: NaiveDate) -> Option<(u32, NaiveDate)> {
    let mut years = u32::try_from(end.year() - start.year()).ok()?;
    let mut reached = anniversary(start, years)?;
    while reached > end && years > 0 {
        years -= 1;
        reached = anniversary(start, years)?;
    }
    Some((years, reached))
}

/// Years from `start` to `end` using the exact-day definition
///
/// Returns `None` when `end` precedes `start`.
#[must_use]
pub fn fractional_years(start: NaiveDate, end: NaiveDate) -> Option<f64> {
    if end < start {
        return None;
    }
    let (years, reached) = whole_years(start, end)?;
    let next = anniversary(start, years + 1)?;
    let remaining = (end - reached).num_days();
    let year_length = (next - reached).num_days();
    #[allow(clippy::cast_precision_loss)]
    let fraction = remaining as f64 / year_length as f64;
    Some(f64::from(years) + fraction)
}

/// Whether more than `threshold` years separate `start` and `end`
#[must_use]
pub fn exceeds_years(start: NaiveDate, end: NaiveDate, threshold: f64) -> bool {
    fractional_years(start, end).is_some_and(|years| years > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_years() {
        assert_eq!(fractional_years(ymd(1900, 6, 30), ymd(1975, 6, 30)), Some(75.0));
        assert_eq!(fractional_years(ymd(1900, 1, 1), ymd(1900, 1, 1)), Some(0.0));
    }

    #[test]
    fn test_partial_year_uses_day_count() {
        let years = fractional_years(ymd(1900, 6, 30), ymd(1975, 1, 1)).unwrap();
        assert!((years - (74.0 + 185.0 / 365.0)).abs() < 1e-9);
        assert!((years - 74.51).abs() < 0.005);
    }

    #[test]
    fn test_leap_year_denominator() {
        // 2019-06-30 .. 2020-06-30 contains Feb 29
        let years = fractional_years(ymd(2019, 6, 30), ymd(2020, 1, 1)).unwrap();
        assert!((years - 185.0 / 366.0).abs() < 1e-9);
    }

    #[test]
    fn test_leap_day_start() {
        let years = fractional_years(ymd(1904, 2, 29), ymd(1905, 2, 28)).unwrap();
        assert!((years - 1.0).abs() < 1e-9);
        let years = fractional_years(ymd(1904, 2, 29), ymd(1908, 2, 29)).unwrap();
        assert!((years - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_interval() {
        assert_eq!(fractional_years(ymd(1975, 1, 1), ymd(1900, 6, 30)), None);
    }

    #[test]
    fn test_exceeds_years() {
        assert!(exceeds_years(ymd(2018, 1, 1), ymd(2021, 12, 2), 2.0));
        assert!(!exceeds_years(ymd(2020, 9, 27), ymd(2021, 12, 2), 2.0));
        assert!(!exceeds_years(ymd(2022, 1, 1), ymd(2021, 12, 2), 2.0));
    }
}
