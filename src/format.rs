//! Formatting and unit conversion helpers.
//!
//! This module provides the km/miles conversions, the hours/minutes time
//! rendering, and the value formatter shared by the report generator and
//! the console summary.

use crate::models::DistanceUnit;

/// Miles per kilometer. Approximate constant; the conversion is not
/// round-trip exact.
pub const MILES_PER_KM: f64 = 0.621371;

/// Sentinel rendered for missing or non-finite values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Presentation kind for [`format_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain number with thousands grouping.
    Number,
    /// Percentage with two decimals and a trailing `%`.
    Percentage,
    /// Two decimals.
    Decimal,
    /// Rounded to a whole number, with thousands grouping.
    Integer,
    /// Minutes rendered as hours and minutes.
    Time,
    /// Unit-converted distance, no decimals.
    Distance,
    /// Unit-converted distance, two decimals.
    DistanceDecimal,
}

/// Convert kilometers to miles.
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

/// Convert miles to kilometers.
#[allow(dead_code)] // Inverse conversion, kept for display round-trips
pub fn miles_to_km(miles: f64) -> f64 {
    miles / MILES_PER_KM
}

/// Convert a kilometer value for display in the given unit.
///
/// Returns `None` for missing or NaN input; formatters render that as
/// the `N/A` sentinel.
pub fn display_distance(value: Option<f64>, unit: DistanceUnit) -> Option<f64> {
    match value {
        Some(v) if !v.is_nan() => Some(unit.from_km(v)),
        _ => None,
    }
}

/// Render minutes as an `Xh Ym` style string.
///
/// Rounds to the nearest whole minute first, then splits into hours
/// (floor division) and remaining minutes (truncated remainder). Renders
/// `"Xm"` when hours is zero, `"Xh"` when minutes is zero, `"Xh Ym"`
/// otherwise. Negative input is not special-cased.
pub fn format_hours_minutes(minutes: Option<f64>) -> String {
    let minutes = match minutes {
        Some(m) if !m.is_nan() => m,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let total_minutes = minutes.round();
    let hours = (total_minutes / 60.0).floor() as i64;
    let remaining_minutes = total_minutes as i64 % 60;

    if hours == 0 {
        format!("{}m", remaining_minutes)
    } else if remaining_minutes == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, remaining_minutes)
    }
}

/// Format a value for display according to its presentation kind.
pub fn format_value(value: Option<f64>, kind: ValueKind, unit: DistanceUnit) -> String {
    let v = match value {
        Some(v) if !v.is_nan() => v,
        _ => return NOT_AVAILABLE.to_string(),
    };

    match kind {
        ValueKind::Number => format_grouped(v),
        ValueKind::Percentage => format!("{:.2}%", v),
        ValueKind::Decimal => format!("{:.2}", v),
        ValueKind::Integer => group_thousands(v.round() as i64),
        ValueKind::Time => format_hours_minutes(Some(v)),
        ValueKind::Distance => format!("{:.0}", unit.from_km(v)),
        ValueKind::DistanceDecimal => format!("{:.2}", unit.from_km(v)),
    }
}

/// Group a whole number with comma thousands separators.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let grouped = group_digits(&digits);

    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Insert a comma before every group of three digits.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Group a number keeping up to three fractional digits, trailing zeros
/// trimmed.
fn format_grouped(v: f64) -> String {
    let rendered = format!("{:.3}", v.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut out = String::new();
    if v < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));

    let frac = frac_part.trim_end_matches('0');
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }

    out
}
