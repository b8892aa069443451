//! Daily zmanim payload normalization.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{DailyLocation, DailyTimes, DailyTimesSnapshot};

use super::time::{format_zman, parse_timezone};

/// Build a daily snapshot from a `/zmanim` body.
///
/// `requested_date` is used when the payload does not echo a date. A missing
/// or unknown `tzid` leaves every time unavailable.
pub fn normalize_daily(payload: &Value, requested_date: &str) -> DailyTimesSnapshot {
    let empty = Map::new();

    let location = payload
        .get("location")
        .and_then(Value::as_object)
        .map(daily_location)
        .unwrap_or_default();

    let tz = parse_timezone(location.tzid.as_deref());
    if tz.is_none() {
        debug!(tzid = ?location.tzid, "No usable timezone, daily times unavailable");
    }

    let times = payload
        .get("times")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let date = payload
        .get("date")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(|d| d.get(..10).unwrap_or(d))
        .unwrap_or(requested_date)
        .to_string();

    DailyTimesSnapshot {
        date,
        times: DailyTimes::from_fn(|key| {
            let raw = times.get(key).and_then(Value::as_str).unwrap_or("");
            format_zman(raw, tz)
        }),
        location,
    }
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn f64_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

fn i64_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Field-by-field so one oddly typed value does not discard the rest.
fn daily_location(map: &Map<String, Value>) -> DailyLocation {
    DailyLocation {
        latitude: f64_field(map, "latitude"),
        longitude: f64_field(map, "longitude"),
        il: map.get("il").and_then(Value::as_bool),
        tzid: str_field(map, "tzid"),
        name: str_field(map, "name"),
        cc: str_field(map, "cc"),
        geo: str_field(map, "geo"),
        geonameid: i64_field(map, "geonameid"),
        asciiname: str_field(map, "asciiname"),
        admin1: str_field(map, "admin1"),
        population: i64_field(map, "population"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNAVAILABLE;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "date": "2026-10-16",
            "location": {
                "latitude": 40.71427,
                "longitude": -74.00597,
                "il": false,
                "tzid": "America/New_York",
                "name": "New York, NY, USA",
                "cc": "US",
                "geo": "geoname",
                "geonameid": 5128581,
                "asciiname": "New York City",
                "admin1": "New York",
                "population": 8175133
            },
            "times": {
                "chatzotNight": "2026-10-16T00:47:00-04:00",
                "alotHaShachar": "2026-10-16T05:46:00-04:00",
                "sunrise": "2026-10-16T07:09:00-04:00",
                "sofZmanShma": "2026-10-16T09:58:00-04:00",
                "sofZmanShmaMGA": "",
                "chatzot": "2026-10-16T12:47:00-04:00",
                "sunset": "2026-10-16T18:24:00-04:00",
                "tzeit72min": "garbage",
                "tzeit42min": 42
            }
        })
    }

    #[test]
    fn test_formats_each_field_in_location_zone() {
        let snapshot = normalize_daily(&payload(), "2026-10-16");
        assert_eq!(snapshot.date, "2026-10-16");
        assert_eq!(snapshot.times.chatzot_night, "12:47 AM");
        assert_eq!(snapshot.times.alot_ha_shachar, "5:46 AM");
        assert_eq!(snapshot.times.sunrise, "7:09 AM");
        assert_eq!(snapshot.times.chatzot, "12:47 PM");
        assert_eq!(snapshot.times.sunset, "6:24 PM");
    }

    #[test]
    fn test_bad_fields_are_isolated() {
        let snapshot = normalize_daily(&payload(), "2026-10-16");
        // Empty, unparseable, wrongly typed and missing values
        assert_eq!(snapshot.times.sof_zman_shma_mga, UNAVAILABLE);
        assert_eq!(snapshot.times.tzeit_72min, UNAVAILABLE);
        assert_eq!(snapshot.times.tzeit_42min, UNAVAILABLE);
        assert_eq!(snapshot.times.dusk, UNAVAILABLE);
        // Neighbours are unaffected
        assert_eq!(snapshot.times.sof_zman_shma, "9:58 AM");
        assert_eq!(snapshot.times.available_count(), 6);
    }

    #[test]
    fn test_missing_timezone_degrades_everything() {
        let mut raw = payload();
        raw["location"]
            .as_object_mut()
            .unwrap()
            .remove("tzid");
        let snapshot = normalize_daily(&raw, "2026-10-16");
        assert_eq!(snapshot.times, DailyTimes::unavailable());
        assert_eq!(snapshot.location.cc.as_deref(), Some("US"));
    }

    #[test]
    fn test_location_metadata() {
        let snapshot = normalize_daily(&payload(), "2026-10-16");
        let loc = &snapshot.location;
        assert_eq!(loc.geonameid, Some(5128581));
        assert_eq!(loc.population, Some(8175133));
        assert_eq!(loc.il, Some(false));
        assert_eq!(loc.latitude, Some(40.71427));
        assert_eq!(loc.asciiname.as_deref(), Some("New York City"));
    }

    #[test]
    fn test_empty_payload_uses_requested_date() {
        let snapshot = normalize_daily(&json!({}), "2026-10-18");
        assert_eq!(snapshot.date, "2026-10-18");
        assert_eq!(snapshot.location, DailyLocation::default());
        assert_eq!(snapshot.times.available_count(), 0);
    }
}
