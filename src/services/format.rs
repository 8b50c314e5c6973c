//! Human-facing size, duration and relative-time phrases.

use chrono::{DateTime, Duration, Utc};

const SIZE_UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with binary units, e.g. `"1.5 KB"`.
///
/// Values below 1 KiB are spelled out in bytes; larger values keep one
/// decimal, dropped when it is zero.
pub fn human_size(bytes: i64) -> String {
    if bytes.unsigned_abs() < 1024 {
        return if bytes == 1 {
            "1 Byte".to_string()
        } else {
            format!("{} Bytes", bytes)
        };
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{:.1}", value);
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{} {}", rendered, SIZE_UNITS[unit])
}

/// Format the time between two instants compactly, e.g. `"2m 5s"`.
///
/// A negative span (finish before start) is rendered as zero.
pub fn describe_duration(start: DateTime<Utc>, finish: DateTime<Utc>) -> String {
    let total_secs = (finish - start).num_seconds().max(0);
    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}

/// Describe an instant relative to `now`, e.g. `"5 minutes ago"`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - then;
    if delta < Duration::zero() {
        format!("in {}", distance_in_words(-delta))
    } else if delta < Duration::minutes(1) {
        "less than a minute ago".to_string()
    } else {
        format!("{} ago", distance_in_words(delta))
    }
}

fn distance_in_words(span: Duration) -> String {
    let minutes = span.num_minutes();
    if minutes < 1 {
        return "less than a minute".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = span.num_hours();
    if hours < 24 {
        return format!("about {}", plural(hours, "hour"));
    }

    plural(span.num_days(), "day")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
