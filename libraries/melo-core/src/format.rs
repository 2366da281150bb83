//! Display formatting shared by Melo front ends
//!
//! Labels for the transport clock, result durations, view counts and
//! publish times.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Transport clock label in the form `M:SS`
///
/// Zero, negative and non-finite inputs all render as `00:00`.
pub fn clock_label(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 1.0 {
        return "00:00".to_string();
    }
    let t = seconds.floor() as u64;
    format!("{}:{:02}", t / 60, t % 60)
}

/// Duration label `H:MM:SS` with leading zeros and separators trimmed
///
/// `185` → `3:05`, `3600` → `1:00:00`, `5` → `5`.
pub fn duration_label(seconds: u64) -> String {
    let full = format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );
    match full.find(|c: char| matches!(c, '1'..='9')) {
        Some(start) => full[start..].to_string(),
        None => full,
    }
}

/// Abbreviated view count: `950`, `1.2K`, `12K`, `340M`, `1.5B`
///
/// Counts at the start of a thousands group keep one decimal.
pub fn view_count_label(views: u64) -> String {
    if views == 0 {
        return "0".to_string();
    }

    let order = (views as f64).log10().floor() as u32;
    // Billions is the largest unit; larger counts stay in billions.
    let group = (order / 3).min(3);
    let scaled = views as f64 / 1000f64.powi(group as i32);

    let digits = if order == group * 3 {
        format!("{:.1}", scaled)
    } else {
        format!("{}", scaled.floor() as u64)
    };

    match group {
        0 => digits,
        1 => format!("{digits}K"),
        2 => format!("{digits}M"),
        _ => format!("{digits}B"),
    }
}

/// Coarse "time ago" label for a publish date
///
/// Compares calendar fields from the largest unit down and reports the first
/// unit that moved forward.
pub fn published_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diffs = [
        (i64::from(now.year()) - i64::from(published.year()), "year"),
        (i64::from(now.month()) - i64::from(published.month()), "month"),
        (i64::from(now.day()) - i64::from(published.day()), "day"),
        (i64::from(now.hour()) - i64::from(published.hour()), "hour"),
        (i64::from(now.minute()) - i64::from(published.minute()), "minute"),
    ];

    for (diff, unit) in diffs {
        if diff > 0 {
            return plural_ago(diff, unit);
        }
    }

    let seconds = i64::from(now.second()) - i64::from(published.second());
    plural_ago(seconds.max(0), "second")
}

fn plural_ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Fill percentage of a range slider track
pub fn slider_fill_percent(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clock_labels() {
        assert_eq!(clock_label(0.0), "00:00");
        assert_eq!(clock_label(f64::NAN), "00:00");
        assert_eq!(clock_label(-3.0), "00:00");
        assert_eq!(clock_label(5.9), "0:05");
        assert_eq!(clock_label(65.0), "1:05");
        assert_eq!(clock_label(600.0), "10:00");
    }

    #[test]
    fn duration_labels_trim_leading_zeros() {
        assert_eq!(duration_label(185), "3:05");
        assert_eq!(duration_label(60), "1:00");
        assert_eq!(duration_label(600), "10:00");
        assert_eq!(duration_label(3600), "1:00:00");
        assert_eq!(duration_label(5), "5");
        assert_eq!(duration_label(0), "0:00:00");
    }

    #[test]
    fn view_count_labels() {
        assert_eq!(view_count_label(950), "950");
        assert_eq!(view_count_label(1234), "1.2K");
        assert_eq!(view_count_label(12_345), "12K");
        assert_eq!(view_count_label(340_000_000), "340M");
        assert_eq!(view_count_label(1_500_000_000), "1.5B");
        assert_eq!(view_count_label(1_000_000_000_000), "1000B");
        assert_eq!(view_count_label(25_000_000_000_000), "25000B");
    }

    #[test]
    fn published_ago_picks_largest_changed_unit() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap();

        let then = Utc.with_ymd_and_hms(2021, 6, 15, 12, 30, 45).unwrap();
        assert_eq!(published_ago(then, now), "3 years ago");

        let then = Utc.with_ymd_and_hms(2024, 6, 15, 11, 30, 45).unwrap();
        assert_eq!(published_ago(then, now), "1 hour ago");

        let then = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 40).unwrap();
        assert_eq!(published_ago(then, now), "5 seconds ago");
    }

    #[test]
    fn slider_fill() {
        assert_eq!(slider_fill_percent(50.0, 0.0, 200.0), 25.0);
        assert_eq!(slider_fill_percent(5.0, 5.0, 5.0), 0.0);
    }
}
