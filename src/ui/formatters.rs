use chrono::{Local, TimeZone};
use humansize::{format_size, DECIMAL};

/// Format a transfer rate in human-readable units (e.g. "1.25 MB/s")
pub fn format_rate(bytes_per_sec: f64) -> String {
    let magnitude = if bytes_per_sec.is_finite() && bytes_per_sec > 0.0 {
        bytes_per_sec.round() as u64
    } else {
        0
    };
    format!("{}/s", format_size(magnitude, DECIMAL))
}

/// Format a unix timestamp as a local wall-clock label (HH:MM:SS)
pub fn format_clock(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M:%S").to_string(),
        _ => "--:--:--".to_string(),
    }
}
