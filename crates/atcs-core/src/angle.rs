//! Sexagesimal angle codec.
//!
//! ATCL carries right ascension as `HH:MM:SS.t` and declination (and site
//! coordinates) as `DD:MM:SS` with the sign sent separately. Every function
//! here is pure.
//!
//! The two directions do not round the same way. Hours are truncated to the
//! tenth of a second; degrees are rounded half-up to the whole second. The
//! controller firmware expects exactly this, so the asymmetry stays.

use std::fmt;

use crate::error::{Error, Result};

/// Sign of a degree value, kept apart from the digits so that `-0.5°`
/// still encodes as `-` + `00:30:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// The wire character for this sign.
    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------

/// Tenths of a second in one hour.
const TENTHS_PER_HOUR: f64 = 36_000.0;

/// Guard against `x.9999999` landing one tenth low after floating-point
/// multiplication.
const TRUNCATE_EPSILON: f64 = 1e-6;

const TENTHS_PER_DAY: u64 = 864_000;

/// Encode decimal hours as `HH:MM:SS.t`.
///
/// Input is wrapped into `[0, 24)`. Seconds are truncated to one decimal,
/// never rounded, so the field can never reach `60.0`.
///
/// ```
/// use atcs_core::angle::hours_to_sexagesimal;
///
/// assert_eq!(hours_to_sexagesimal(12.5), "12:30:00.0");
/// assert_eq!(hours_to_sexagesimal(6.0 + 15.0 / 60.0 + 7.25 / 3600.0), "06:15:07.2");
/// ```
pub fn hours_to_sexagesimal(hours: f64) -> String {
    let hours = if hours.is_finite() { hours.rem_euclid(24.0) } else { 0.0 };
    // The epsilon must not lift 23:59:59.9x into the next day.
    let tenths =
        ((hours * TENTHS_PER_HOUR + TRUNCATE_EPSILON).floor() as u64).min(TENTHS_PER_DAY - 1);

    let hh = tenths / 36_000;
    let mm = (tenths / 600) % 60;
    let ss_tenths = tenths % 600;

    format!(
        "{:02}:{:02}:{:02}.{}",
        hh,
        mm,
        ss_tenths / 10,
        ss_tenths % 10
    )
}

/// Encode decimal degrees as `DD:MM:SS` plus a separate [`Sign`].
///
/// The sign is taken before the magnitude is used. Seconds are rounded
/// half-up; a rounded `60` carries into the minutes (and on into the
/// degrees) so the text is always well formed.
///
/// ```
/// use atcs_core::angle::{Sign, degrees_to_sexagesimal};
///
/// assert_eq!(degrees_to_sexagesimal(-0.5), ("00:30:00".to_string(), Sign::Minus));
/// assert_eq!(degrees_to_sexagesimal(45.25), ("45:15:00".to_string(), Sign::Plus));
/// ```
pub fn degrees_to_sexagesimal(degrees: f64) -> (String, Sign) {
    let sign = if degrees < 0.0 { Sign::Minus } else { Sign::Plus };
    let magnitude = if degrees.is_finite() { degrees.abs() } else { 0.0 };
    let total_secs = (magnitude * 3600.0 + 0.5).floor() as u64;

    let dd = total_secs / 3600;
    let mm = (total_secs / 60) % 60;
    let ss = total_secs % 60;

    (format!("{dd:02}:{mm:02}:{ss:02}"), sign)
}

/// Encode degrees as a single signed token, e.g. `-12:30:00`.
pub fn signed_degrees(degrees: f64) -> String {
    let (text, sign) = degrees_to_sexagesimal(degrees);
    format!("{sign}{text}")
}

// ---------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------

/// Split `text` on `:` and parse the first three fields.
fn fields(text: &str) -> Result<(&str, f64, f64, f64)> {
    let parts: Vec<&str> = text.trim().split(':').map(str::trim).collect();
    if parts.len() < 3 {
        return Err(Error::Parse(format!(
            "expected 3 colon-separated fields, got {} in {text:?}",
            parts.len()
        )));
    }

    let parse = |s: &str| -> Result<f64> {
        s.parse::<f64>()
            .map_err(|_| Error::Parse(format!("invalid field {s:?} in {text:?}")))
    };

    Ok((parts[0], parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
}

/// Decode `HH:MM:SS[.t]` to decimal hours.
///
/// ```
/// use atcs_core::angle::sexagesimal_to_hours;
///
/// let h = sexagesimal_to_hours("12:30:00.0").unwrap();
/// assert!((h - 12.5).abs() < 1e-9);
/// assert!(sexagesimal_to_hours("12:30").is_err());
/// ```
pub fn sexagesimal_to_hours(text: &str) -> Result<f64> {
    let (_, h, m, s) = fields(text)?;
    Ok(h + m / 60.0 + s / 3600.0)
}

/// Decode `[+|-]DD:MM:SS` to decimal degrees.
///
/// A negative degree field makes the whole value negative, so the minutes
/// and seconds are subtracted. `-00:30:00` is negative even though the
/// degree field parses to zero.
pub fn sexagesimal_to_degrees(text: &str) -> Result<f64> {
    let (raw_deg, d, m, s) = fields(text)?;
    let magnitude = d.abs() + m / 60.0 + s / 3600.0;
    if raw_deg.starts_with('-') {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

// ---------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------

/// Human-readable right ascension, e.g. `12h 30m 00.0s`.
pub fn format_ra(hours: f64) -> String {
    let text = hours_to_sexagesimal(hours);
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s)) => format!("{h}h {m}m {s}s"),
        _ => text,
    }
}

/// Human-readable declination, e.g. `+45° 15' 00"`.
pub fn format_dec(degrees: f64) -> String {
    let (text, sign) = degrees_to_sexagesimal(degrees);
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(d), Some(m), Some(s)) => format!("{sign}{d}° {m}' {s}\""),
        _ => format!("{sign}{text}"),
    }
}
