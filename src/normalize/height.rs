//! Height and weight parsing.

use crate::normalize::issue::ParseFailure;

/// Largest feet component that can be real
pub const MAX_FEET: u32 = 7;
/// Smallest height in inches accepted from any layout
pub const MIN_HEIGHT_INCHES: u32 = 48;

/// Parse a height to total inches
///
/// Accepts `FEET-INCHES` (Retrosheet, e.g. `6-2`) and a bare integer count of
/// inches (Lahman, e.g. `74`). A feet component above [`MAX_FEET`], inches
/// outside `0..=11`, or a total above `max_inches` is rejected. Blank input
/// is missing data.
pub fn parse_height(s: &str, max_inches: u32) -> Result<Option<u32>, ParseFailure> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let total = match s.split_once(['-', '\'']) {
        Some((feet, inches)) => {
            let feet = feet.trim();
            let inches = inches.trim().trim_end_matches('"').trim();
            if feet.is_empty() {
                return Err(ParseFailure::InvalidComponent("missing feet".to_string()));
            }
            let feet: u32 = feet
                .parse()
                .map_err(|_| ParseFailure::InvalidComponent(format!("feet {feet:?}")))?;
            if feet > MAX_FEET {
                return Err(ParseFailure::Implausible(format!("{feet} feet")));
            }
            if inches.is_empty() {
                return Err(ParseFailure::InvalidComponent("missing inches".to_string()));
            }
            let inches: u32 = inches
                .parse()
                .map_err(|_| ParseFailure::InvalidComponent(format!("inches {inches:?}")))?;
            if inches > 11 {
                return Err(ParseFailure::InvalidComponent(format!("{inches} inches")));
            }
            feet * 12 + inches
        }
        None => s
            .parse::<u32>()
            .map_err(|_| ParseFailure::Unrecognized(s.to_string()))?,
    };

    if !(MIN_HEIGHT_INCHES..=max_inches).contains(&total) {
        return Err(ParseFailure::Implausible(format!("{total} inches")));
    }
    Ok(Some(total))
}

/// Parse a weight in pounds; blank is missing
///
/// Weights outside `min_pounds..=max_pounds` are rejected.
pub fn parse_weight(s: &str, min_pounds: u32, max_pounds: u32) -> Result<Option<u32>, ParseFailure> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let pounds: u32 = s
        .parse()
        .map_err(|_| ParseFailure::Unrecognized(s.to_string()))?;
    if !(min_pounds..=max_pounds).contains(&pounds) {
        return Err(ParseFailure::Implausible(format!("{pounds} pounds")));
    }
    Ok(Some(pounds))
}
