use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A resolvable place returned by location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Geoname identifier, or the postal code for zip records.
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin2: Option<String>,
    #[serde(default)]
    pub is_postal_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl LocationRecord {
    /// Name to show for this record, falling back through the subdivisions.
    pub fn display_name(&self) -> &str {
        [Some(self.name.as_str()), self.admin2.as_deref(), self.admin1.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// The user's preferred location, persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub location_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_postal_code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl SavedLocation {
    pub fn from_record(record: &LocationRecord) -> Self {
        Self {
            display_name: record.display_name().to_string(),
            coordinates: record.coordinates,
            location_id: record.id.clone(),
            is_postal_code: record.is_postal_code.then_some(true),
            postal_code: record.postal_code.clone(),
        }
    }

    pub fn is_postal_code(&self) -> bool {
        self.is_postal_code.unwrap_or(false)
    }
}
