//! Data models for Hebcal payloads and normalized snapshots.
//!
//! - `RawCalendarItem`, `ShabbatResponse`: weekly payload as delivered upstream
//! - `ShabbatSnapshot`, `HolidayEntry`: normalized weekly data
//! - `DailyTimesSnapshot`, `DailyTimes`, `DailyLocation`: normalized zmanim
//! - `LocationRecord`, `SavedLocation`: location search results and preferences

pub mod calendar;
pub mod location;
pub mod zmanim;

pub use calendar::{
    CalendarLocation, HolidayEntry, RawCalendarItem, ShabbatResponse, ShabbatSnapshot,
    LOCATION_UNAVAILABLE, UNAVAILABLE,
};
pub use location::{Coordinates, LocationRecord, SavedLocation};
pub use zmanim::{DailyLocation, DailyTimes, DailyTimesSnapshot, ZMANIM_FIELDS};
