//! Number formatting for dashboard cells
//!
//! Every function here is total: a missing or non-numeric field formats to
//! [`PLACEHOLDER`].

use super::Tone;
use crate::shared::types::Field;

/// Literal shown for absent or non-numeric values
pub const PLACEHOLDER: &str = "N/A";

/// Fixed-precision number with ',' thousands separators (e.g. 1234567.891 → "1,234,567.89")
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let digits = integer.len();
    let mut grouped = String::with_capacity(formatted.len() + digits / 3 + 1);
    if value.is_sign_negative() {
        grouped.push('-');
    }
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Grouped number with optional unit suffix, or the placeholder
pub fn format_number(field: &Field, decimals: usize, unit: Option<&str>) -> String {
    match field {
        Field::Number(value) => match unit {
            Some(unit) => format!("{} {}", group_thousands(*value, decimals), unit),
            None => group_thousands(*value, decimals),
        },
        Field::NonNumeric(_) | Field::Absent => PLACEHOLDER.to_string(),
    }
}

/// Signed percentage with 2 decimals and its polarity (`>= 0` is positive,
/// placeholder is neutral)
pub fn format_change(change_pct: &Field) -> (String, Option<Tone>) {
    match change_pct {
        Field::Number(rate) => {
            let tone = if *rate >= 0.0 {
                Tone::Positive
            } else {
                Tone::Negative
            };
            (format!("{rate:.2}%"), Some(tone))
        }
        Field::NonNumeric(_) | Field::Absent => (PLACEHOLDER.to_string(), Some(Tone::Neutral)),
    }
}
