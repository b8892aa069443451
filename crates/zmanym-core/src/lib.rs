//! Core library for zmanym.
//!
//! Fetches Shabbat, holiday and daily zmanim data from the Hebcal API,
//! normalizes the loosely-typed payloads into stable snapshot types and keeps
//! a local cache so repeated lookups for the same place stay offline.
//!
//! Layout:
//! - [`api`]: the remote calendar gateway (`CalendarGateway`, `HebcalClient`)
//! - [`normalize`]: pure payload-to-snapshot conversion
//! - [`cache`]: storage backends and the TTL-aware `CacheManager`
//! - [`location`]: search result parsing and coordinate resolution
//! - [`client`]: the `ZmanymClient` facade used by front-ends

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod normalize;
pub mod preferences;
pub mod utils;

pub use api::{ApiError, CalendarGateway, HebcalClient, LocationQuery};
pub use cache::{CacheManager, FileStore, KeyValueStore, MemoryStore};
pub use client::ZmanymClient;
pub use config::Config;
pub use error::{ErrorKind, ZmanymError};
pub use location::{LocationResolver, SupportedRegion};
pub use models::{
    Coordinates, DailyLocation, DailyTimes, DailyTimesSnapshot, HolidayEntry, LocationRecord,
    SavedLocation, ShabbatSnapshot, UNAVAILABLE,
};
pub use preferences::LocationPreferences;
