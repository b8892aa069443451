use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Sentinel used for every field that could not be extracted.
pub const UNAVAILABLE: &str = "Not available";

/// Location string used when the payload carries no location object.
pub const LOCATION_UNAVAILABLE: &str = "Location not available";

/// One entry of the Hebcal `items` array, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCalendarItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub hebrew: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl RawCalendarItem {
    pub fn is_category(&self, category: &str) -> bool {
        self.category == category
    }

    /// Hebrew text, ignoring empty strings.
    pub fn hebrew_text(&self) -> Option<&str> {
        self.hebrew.as_deref().filter(|h| !h.is_empty())
    }

    pub fn memo_contains(&self, needle: &str) -> bool {
        self.memo.as_deref().is_some_and(|m| m.contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub tzid: Option<String>,
    #[serde(default)]
    pub geo: Option<String>,
}

impl CalendarLocation {
    /// "City, Country", with "Unknown" standing in for missing parts.
    pub fn display(&self) -> String {
        let part = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string()
        };
        format!("{}, {}", part(&self.city), part(&self.country))
    }
}

/// Weekly payload from the `/shabbat` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShabbatResponse {
    pub items: Vec<RawCalendarItem>,
    pub location: Option<CalendarLocation>,
}

impl ShabbatResponse {
    /// Decode the upstream body. Returns `None` only when the body is not a
    /// JSON object at all; malformed individual items are skipped.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;

        let items = object
            .get("items")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .filter_map(|item| match RawCalendarItem::deserialize(item) {
                        Ok(parsed) => Some(parsed),
                        Err(e) => {
                            debug!(error = %e, "Skipping unreadable calendar item");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let location = object
            .get("location")
            .filter(|v| v.is_object())
            .map(|v| CalendarLocation::deserialize(v).unwrap_or_default());

        Some(Self { items, location })
    }
}

/// Normalized weekly data. Every string field is either a real value or
/// [`UNAVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShabbatSnapshot {
    pub candle_lighting: String,
    pub havdalah: String,
    pub parsha: String,
    pub gregorian_date: String,
    pub hebrew_date: String,
    pub location: String,
    pub holidays: Vec<HolidayEntry>,
}

impl ShabbatSnapshot {
    pub fn has_candle_lighting(&self) -> bool {
        self.candle_lighting != UNAVAILABLE
    }

    pub fn has_havdalah(&self) -> bool {
        self.havdalah != UNAVAILABLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayEntry {
    pub title: String,
    pub date: String,
    pub category: String,
    /// Empty when no candle-lighting item mentions this holiday.
    #[serde(default)]
    pub candle_lighting: String,
}

impl HolidayEntry {
    pub fn has_candle_lighting(&self) -> bool {
        !self.candle_lighting.is_empty()
    }

    pub fn category_display(&self) -> &str {
        match self.category.as_str() {
            "major" => "Major holiday",
            "minor" => "Minor holiday",
            "holiday" => "Holiday",
            other => other,
        }
    }
}
