//! Display Formatters
//!
//! Pure helpers that turn raw values into the short strings shown on the
//! dashboard: relative ages for activity entries and abbreviated currency
//! amounts for the asset card.

use chrono::{DateTime, Utc};

/// Default currency marker prepended by [`format_currency`]
pub const DEFAULT_CURRENCY_PREFIX: &str = "Rp";

/// Magnitude thresholds, largest first
const SUFFIXES: [(f64, &str); 5] = [
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
    (1.0, ""),
];

/// Format a point in time relative to `now`.
///
/// Returns `"just now"`, `"<n>m ago"`, `"<n>h ago"` or `"<n>d ago"`. Each
/// bucket is derived from the previous one by rounded division, so the
/// output never falls back to an absolute date: a timestamp from years ago
/// still reads as a (large) number of days.
pub fn time_ago(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = date else {
        return String::new();
    };

    let elapsed_ms = (now - date).num_milliseconds() as f64;
    let minutes = (elapsed_ms / 60_000.0).round();
    if minutes < 1.0 {
        return "just now".to_string();
    }
    if minutes < 60.0 {
        return format!("{}m ago", minutes as i64);
    }

    let hours = (minutes / 60.0).round();
    if hours < 24.0 {
        return format!("{}h ago", hours as i64);
    }

    let days = (hours / 24.0).round();
    format!("{}d ago", days as i64)
}

/// Format an amount with the default prefix and one decimal place.
pub fn format_currency(value: f64) -> String {
    format_large_number(value, 1, DEFAULT_CURRENCY_PREFIX)
}

/// Abbreviate a magnitude with a T/B/M/K suffix.
///
/// The first threshold (descending) that `|value|` meets selects the suffix.
/// The scaled value is printed with `precision` decimals and an all-zero
/// fraction is dropped, so `1_000_000.0` becomes `"Rp 1M"` while
/// `1_250_000.0` becomes `"Rp 1.3M"`. Ties round away from zero.
pub fn format_large_number(value: f64, precision: usize, prefix: &str) -> String {
    let (threshold, suffix) = SUFFIXES
        .iter()
        .copied()
        .find(|(threshold, _)| value.abs() >= *threshold)
        .unwrap_or(SUFFIXES[SUFFIXES.len() - 1]);

    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    let mut rounded = (value / threshold * factor).round() / factor;
    // -0.0 prints with its sign
    if rounded == 0.0 {
        rounded = 0.0;
    }

    let formatted = format!("{:.*}", precision, rounded);
    let scaled = match precision {
        0 => formatted.as_str(),
        p => {
            let zero_fraction = format!(".{}", "0".repeat(p));
            formatted
                .strip_suffix(zero_fraction.as_str())
                .unwrap_or(formatted.as_str())
        }
    };

    format!("{} {}{}", prefix, scaled, suffix)
}
