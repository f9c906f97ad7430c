//! Display helpers for file sizes and Unix timestamps.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, TimeZone};

const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Human-readable size, e.g. `1536` → `"1.5 kB"`.
///
/// Zero is the bare string `"0"`. The unit is picked by powers of 1024 and
/// stops at `TB`: anything larger is printed as a multiple of TB. The value
/// is rounded to two decimals with trailing zeros dropped.
pub fn human_file_size(size: u64) -> String {
    if size == 0 {
        return "0".to_string();
    }

    let mut class = 0;
    let mut rest = size;
    while rest >= 1024 && class < UNITS.len() - 1 {
        rest /= 1024;
        class += 1;
    }

    let scaled = size as f64 / 1024f64.powi(class as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[class])
}

/// `YYYY-MM-DD HH:MM:SS` in the host's local timezone.
///
/// The year is zero-padded to at least four digits and never carries a `+`
/// sign, so year 10000 prints as `10000`. `None` if the timestamp is outside
/// the representable range.
pub fn human_timestamp(timestamp: i64) -> Option<String> {
    human_timestamp_in(timestamp, &Local)
}

/// Same as [`human_timestamp`], in an explicit timezone.
pub fn human_timestamp_in<Tz>(timestamp: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = DateTime::from_timestamp(timestamp, 0)?.with_timezone(tz);
    Some(format!("{:04}-{}", local.year(), local.format("%m-%d %H:%M:%S")))
}
