//! Coordinate text parsing
//!
//! Converts the two textual coordinate notations found in survey data into
//! signed decimal degrees:
//!
//! - Decimal degrees with either separator: `-2.21`, `-2,21`
//! - Degrees/minutes/seconds with hemisphere: `23°12'30.5"S`
//!
//! Decimal parsing is lenient (a miss is `None`, the caller decides what
//! that means). DMS parsing is strict and reports [`CoordError::Format`] so
//! the import layer can skip the offending row.

mod types;

pub use types::{CoordError, Coordinate};

use regex::Regex;
use std::sync::OnceLock;

/// Decimal places kept when converting DMS to decimal degrees.
pub const DMS_DECIMAL_PLACES: i32 = 2;

/// Parses decimal-degree text, accepting a comma as decimal separator.
///
/// Returns `None` for empty, non-numeric or non-finite input.
///
/// # Examples
///
/// ```
/// use bathyquery::coord::parse_decimal;
///
/// assert_eq!(parse_decimal("-2,21"), Some(-2.21));
/// assert_eq!(parse_decimal("-47.43"), Some(-47.43));
/// assert_eq!(parse_decimal("abc"), None);
/// ```
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Get the DMS regex pattern.
///
/// Pattern: `<deg>° <min>' <sec>" <hemisphere>`
///
/// We capture:
/// - Group 1: degrees (1-3 digits)
/// - Group 2: minutes (1-2 digits)
/// - Group 3: seconds (digits with optional fraction)
/// - Group 4: hemisphere letter (N, S, E or W, any case)
fn dms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(\d{1,3})°\s*(\d{1,2})'\s*(\d+(?:\.\d+)?)"\s*([NSEWnsew])$"#)
            .expect("DMS pattern is a valid regex")
    })
}

/// Parses a degrees/minutes/seconds string into signed decimal degrees.
///
/// Southern and western hemispheres are negative. The result is rounded to
/// [`DMS_DECIMAL_PLACES`] decimal places.
///
/// # Examples
///
/// ```
/// use bathyquery::coord::parse_dms;
///
/// assert_eq!(parse_dms("23°12'30.5\"S").unwrap(), -23.21);
/// assert!(parse_dms("23.21").is_err());
/// ```
pub fn parse_dms(text: &str) -> Result<f64, CoordError> {
    let input = text.trim();
    let format_error = || CoordError::Format {
        input: input.to_string(),
    };

    let captures = dms_pattern().captures(input).ok_or_else(format_error)?;

    let group = |index: usize| -> Result<f64, CoordError> {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(format_error)
    };

    let degrees = group(1)?;
    let minutes = group(2)?;
    let seconds = group(3)?;
    let hemisphere = captures
        .get(4)
        .map(|m| m.as_str().to_ascii_uppercase())
        .ok_or_else(format_error)?;

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    let signed = match hemisphere.as_str() {
        "S" | "W" => -magnitude,
        _ => magnitude,
    };

    Ok(round_to(signed, DMS_DECIMAL_PLACES))
}

/// Rounds a value to the given number of decimal places.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
