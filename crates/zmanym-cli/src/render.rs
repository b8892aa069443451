//! Plain-text rendering of snapshots for the terminal.

use std::fmt::Write;

use zmanym_core::cache::CacheInfo;
use zmanym_core::models::{DailyTimesSnapshot, LocationRecord, SavedLocation, ShabbatSnapshot};
use zmanym_core::utils::{format_long_date, truncate};

/// Width of the label column.
const LABEL_WIDTH: usize = 18;

const MAX_NAME_LENGTH: usize = 40;

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {:<width$} {}", label, value, width = LABEL_WIDTH);
}

pub fn records(records: &[LocationRecord]) -> String {
    if records.is_empty() {
        return "No locations found.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let mut detail = vec![record.country.as_str()];
        if let Some(admin1) = record.admin1.as_deref() {
            detail.insert(0, admin1);
        }
        let kind = if record.is_postal_code { "zip" } else { "id" };
        let _ = writeln!(
            out,
            "{:<width$} {} ({} {})",
            truncate(record.display_name(), MAX_NAME_LENGTH),
            detail.join(", "),
            kind,
            record.id,
            width = MAX_NAME_LENGTH
        );
    }
    out
}

pub fn shabbat(snapshot: &ShabbatSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", snapshot.location);
    let _ = writeln!(out, "{}", snapshot.gregorian_date);
    out.push('\n');
    row(&mut out, "Candle lighting", &snapshot.candle_lighting);
    row(&mut out, "Havdalah", &snapshot.havdalah);
    row(&mut out, "Parsha", &snapshot.parsha);
    row(&mut out, "Hebrew date", &snapshot.hebrew_date);

    if !snapshot.holidays.is_empty() {
        out.push_str("\nUpcoming holidays\n");
        for holiday in &snapshot.holidays {
            let date = format_long_date(&holiday.date).unwrap_or_else(|| holiday.date.clone());
            let _ = write!(out, "  {} - {} ({})", holiday.title, date, holiday.category_display());
            if holiday.has_candle_lighting() {
                let _ = write!(out, ", candles {}", holiday.candle_lighting);
            }
            out.push('\n');
        }
    }
    out
}

pub fn daily(snapshot: &DailyTimesSnapshot) -> String {
    let mut out = String::new();
    if let Some(name) = snapshot.location.name.as_deref() {
        let _ = writeln!(out, "{}", name);
    }
    let date = format_long_date(&snapshot.date).unwrap_or_else(|| snapshot.date.clone());
    let _ = writeln!(out, "{}", date);
    out.push('\n');
    for (label, value) in snapshot.times.entries() {
        let _ = writeln!(out, "  {:<44} {}", label, value);
    }
    out
}

pub fn saved_location(location: Option<&SavedLocation>) -> String {
    match location {
        Some(location) => {
            let mut out = String::new();
            let _ = writeln!(out, "{}", location.display_name);
            let kind = if location.is_postal_code() { "Postal code" } else { "Location id" };
            row(&mut out, kind, &location.location_id);
            if let Some(coordinates) = location.coordinates {
                let value = format!("{:.4}, {:.4}", coordinates.latitude, coordinates.longitude);
                row(&mut out, "Coordinates", &value);
            }
            out
        }
        None => "No saved location.\n".to_string(),
    }
}

pub fn cache_info(info: &CacheInfo) -> String {
    if !info.has_cache {
        return "No cached weekly data.\n".to_string();
    }
    let mut out = String::new();
    row(&mut out, "Location", info.location.as_deref().unwrap_or("-"));
    row(&mut out, "Location id", info.location_id.as_deref().unwrap_or("-"));
    row(&mut out, "Updated", &info.age_display());
    out
}
