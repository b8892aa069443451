use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::api::{ApiError, CalendarGateway};
use crate::error::ZmanymError;
use crate::models::{Coordinates, LocationRecord};

/// Candidate field names, first present wins.
const ID_FIELDS: [&str; 3] = ["id", "geonameid", "place_id"];
const NAME_FIELDS: [&str; 4] = ["value", "name", "title", "display_name"];
const ADMIN1_FIELDS: [&str; 3] = ["admin1", "state", "region"];
const ADMIN2_FIELDS: [&str; 4] = ["asciiname", "city", "town", "village"];

/// Label used when coordinates cannot be named.
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

/// The region search results are restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedRegion {
    /// ISO country code, compared against a record's `cc`.
    pub code: String,
    /// Country name, compared against a record's `country` and used as its
    /// default.
    pub country_name: String,
}

impl Default for SupportedRegion {
    fn default() -> Self {
        Self::new("US", "United States")
    }
}

impl SupportedRegion {
    pub fn new(code: &str, country_name: &str) -> Self {
        Self {
            code: code.to_string(),
            country_name: country_name.to_string(),
        }
    }

    pub fn contains(&self, record: &Map<String, Value>) -> bool {
        let field = |key: &str| record.get(key).and_then(Value::as_str);
        field("cc").is_some_and(|cc| cc.eq_ignore_ascii_case(&self.code))
            || field("country") == Some(self.country_name.as_str())
    }
}

/// Records from either response shape: `[...]` or `{ "items": [...] }`.
pub fn record_list(payload: &Value) -> Vec<&Map<String, Value>> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(object) => match object.get("items") {
            Some(Value::Array(records)) => records,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    records.iter().filter_map(Value::as_object).collect()
}

/// First candidate field holding a non-empty string or a number.
fn first_field(record: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Map one upstream record to a `LocationRecord`. Records without any
/// identifier are dropped.
pub fn parse_record(record: &Map<String, Value>, region: &SupportedRegion) -> Option<LocationRecord> {
    let id = first_field(record, &ID_FIELDS)?;
    let is_postal_code = record.get("geo").and_then(Value::as_str) == Some("zip");

    let coordinates = match (
        record.get("latitude").and_then(Value::as_f64),
        record.get("longitude").and_then(Value::as_f64),
    ) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };

    Some(LocationRecord {
        name: first_field(record, &NAME_FIELDS).unwrap_or_default(),
        country: first_field(record, &["country"]).unwrap_or_else(|| region.country_name.clone()),
        admin1: first_field(record, &ADMIN1_FIELDS),
        admin2: first_field(record, &ADMIN2_FIELDS),
        is_postal_code,
        postal_code: is_postal_code.then(|| id.clone()),
        coordinates,
        id,
    })
}

/// Resolves free-text queries and coordinates through a [`CalendarGateway`].
#[derive(Clone)]
pub struct LocationResolver {
    gateway: Arc<dyn CalendarGateway>,
    region: SupportedRegion,
}

impl LocationResolver {
    pub fn new(gateway: Arc<dyn CalendarGateway>, region: SupportedRegion) -> Self {
        Self { gateway, region }
    }

    pub fn region(&self) -> &SupportedRegion {
        &self.region
    }

    /// Search and keep only records in the supported region, in upstream
    /// order.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationRecord>, ApiError> {
        let payload = self.gateway.search(query).await?;
        let records = record_list(&payload);
        let total = records.len();

        let locations: Vec<LocationRecord> = records
            .into_iter()
            .filter(|r| self.region.contains(r))
            .filter_map(|r| parse_record(r, &self.region))
            .collect();

        debug!(
            query = %query,
            total,
            kept = locations.len(),
            region = %self.region.code,
            "Location search"
        );
        Ok(locations)
    }

    /// Identifier of the first place the reverse lookup returns.
    pub async fn resolve_from_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ZmanymError> {
        let payload = self
            .gateway
            .reverse_lookup(latitude, longitude)
            .await
            .map_err(ZmanymError::Lookup)?;

        let id = record_list(&payload)
            .first()
            .and_then(|r| first_field(r, &ID_FIELDS))
            .ok_or_else(|| ZmanymError::NoLocationFound(format!("{},{}", latitude, longitude)))?;

        info!(latitude, longitude, location_id = %id, "Resolved coordinates");
        Ok(id)
    }

    /// "City, Country" for coordinates, or [`CURRENT_LOCATION_LABEL`] when
    /// the lookup fails. Never errors.
    pub async fn describe_coordinates(&self, latitude: f64, longitude: f64) -> String {
        match self.gateway.reverse_geocode(latitude, longitude).await {
            Ok(payload) => {
                let field = |keys: &[&str]| {
                    payload
                        .as_object()
                        .and_then(|o| first_field(o, keys))
                        .unwrap_or_else(|| "Unknown".to_string())
                };
                format!("{}, {}", field(&["city", "locality"]), field(&["countryName"]))
            }
            Err(e) => {
                debug!(error = %e, "Reverse geocoding failed");
                CURRENT_LOCATION_LABEL.to_string()
            }
        }
    }
}
