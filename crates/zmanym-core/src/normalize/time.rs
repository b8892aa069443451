use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

use crate::models::UNAVAILABLE;

/// `7:15pm`, `7:15 PM`: AM/PM-labelled times are tried first.
static TWELVE_HOUR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}:\d{2}\s*[AP]M)").expect("Invalid 12-hour time regex")
});

/// Bare `19:15` as emitted by 24-hour configured feeds.
static TWENTY_FOUR_HOUR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2})").expect("Invalid 24-hour time regex"));

/// Pull a time out of a free-text title such as "Candle lighting: 6:05pm".
pub fn extract_time(title: &str) -> Option<String> {
    TWELVE_HOUR_REGEX
        .captures(title)
        .or_else(|| TWENTY_FOUR_HOUR_REGEX.captures(title))
        .map(|caps| caps[1].to_string())
}

pub fn time_or_unavailable(title: &str) -> String {
    extract_time(title).unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Format an upstream timestamp as `H:MM AM` in `tz`.
///
/// Timestamps with an offset are converted; naive ones are read as wall time
/// in `tz`. Empty input, a missing zone or an unparseable value all give
/// [`UNAVAILABLE`].
pub fn format_zman(raw: &str, tz: Option<Tz>) -> String {
    let Some(tz) = tz else {
        return UNAVAILABLE.to_string();
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return UNAVAILABLE.to_string();
    }

    let local = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&tz)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .and_then(|naive| tz.from_local_datetime(&naive).earliest()),
    };

    match local {
        Some(dt) => dt.format("%-I:%M %p").to_string(),
        None => UNAVAILABLE.to_string(),
    }
}

/// Parse an IANA zone name, treating empty or unknown names as absent.
pub fn parse_timezone(tzid: Option<&str>) -> Option<Tz> {
    tzid.filter(|s| !s.is_empty())?.parse().ok()
}
