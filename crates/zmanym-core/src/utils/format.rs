use chrono::{DateTime, NaiveDate};

/// Format an upstream date as "Friday, October 16, 2026".
///
/// Accepts RFC 3339 timestamps (the calendar date is taken in the timestamp's
/// own offset) or a bare `YYYY-MM-DD` prefix.
pub fn format_long_date(date: &str) -> Option<String> {
    let day = if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.date_naive()
    } else {
        let prefix = date.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?
    };
    Some(day.format("%A, %B %-d, %Y").to_string())
}

/// Human readable age like "5m ago" or "2d ago".
pub fn format_age_minutes(minutes: i64) -> String {
    if minutes < 1 {
        // Includes negative ages from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
