//! Weekly Shabbat payload normalization.

use crate::models::{
    HolidayEntry, RawCalendarItem, ShabbatResponse, ShabbatSnapshot, LOCATION_UNAVAILABLE,
    UNAVAILABLE,
};
use crate::utils::format_long_date;

use super::time::{extract_time, time_or_unavailable};

/// Holiday list cap, applied after filtering.
pub const MAX_HOLIDAYS: usize = 10;

const HOLIDAY_CATEGORIES: [&str; 3] = ["holiday", "major", "minor"];

/// Title fragments that mark an item as something other than a holiday name.
const NON_HOLIDAY_MARKERS: [&str; 6] = [
    "Parashat",
    "parashat",
    "Torah",
    "Weekly",
    "Candle lighting",
    "Havdalah",
];

const PARSHA_PREFIX: &str = "parashat ";

pub fn normalize_shabbat(response: &ShabbatResponse) -> ShabbatSnapshot {
    let items = &response.items;

    let candle_item = items
        .iter()
        .find(|i| i.is_category("candles") && i.title.contains("Candle lighting"));
    let havdalah_item = items
        .iter()
        .find(|i| i.is_category("havdalah") && i.title.contains("Havdalah"));

    let hebrew_date = items
        .iter()
        .filter(|i| i.is_category("holiday"))
        .find_map(|i| i.hebrew_text())
        .unwrap_or(UNAVAILABLE)
        .to_string();

    let location = response
        .location
        .as_ref()
        .map(|l| l.display())
        .unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string());

    ShabbatSnapshot {
        candle_lighting: candle_item
            .map(|i| time_or_unavailable(&i.title))
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        havdalah: havdalah_item
            .map(|i| time_or_unavailable(&i.title))
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        parsha: find_parsha(items)
            .map(|i| strip_parsha_prefix(&i.title).to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        gregorian_date: candle_item
            .and_then(|i| format_long_date(&i.date))
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        hebrew_date,
        location,
        holidays: build_holidays(items),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Two passes: holiday-category items naming a parashah or the Torah, then
/// any item that mentions a parashah, the Torah or a weekly reading.
fn find_parsha(items: &[RawCalendarItem]) -> Option<&RawCalendarItem> {
    items
        .iter()
        .find(|i| {
            i.is_category("holiday")
                && (contains_ignore_case(&i.title, "parashat")
                    || contains_ignore_case(&i.title, "torah"))
        })
        .or_else(|| {
            items.iter().find(|i| {
                ["parashat", "torah", "weekly"]
                    .iter()
                    .any(|marker| contains_ignore_case(&i.title, marker))
            })
        })
}

fn strip_parsha_prefix(title: &str) -> &str {
    match title.get(..PARSHA_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PARSHA_PREFIX) => &title[PARSHA_PREFIX.len()..],
        _ => title,
    }
}

fn has_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

fn is_holiday_name(item: &RawCalendarItem) -> bool {
    HOLIDAY_CATEGORIES.contains(&item.category.as_str())
        && !NON_HOLIDAY_MARKERS.iter().any(|m| item.title.contains(m))
        && !has_hebrew(&item.title)
}

fn build_holidays(items: &[RawCalendarItem]) -> Vec<HolidayEntry> {
    items
        .iter()
        .filter(|i| is_holiday_name(i))
        .take(MAX_HOLIDAYS)
        .map(|holiday| HolidayEntry {
            title: holiday.title.clone(),
            date: holiday.date.clone(),
            category: holiday.category.clone(),
            candle_lighting: holiday_candle_lighting(items, &holiday.title),
        })
        .collect()
}

/// Candle-lighting items name the holiday they precede in their memo.
fn holiday_candle_lighting(items: &[RawCalendarItem], title: &str) -> String {
    items
        .iter()
        .find(|i| i.is_category("candles") && i.memo_contains(title))
        .and_then(|i| extract_time(&i.title))
        .unwrap_or_default()
}
