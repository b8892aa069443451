//! HTTP client for the Hebcal calendar API.
//!
//! `HebcalClient` issues exactly one request per call and hands back the
//! parsed JSON body. Status handling follows `ApiError::from_status`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the Hebcal API
pub const DEFAULT_API_BASE_URL: &str = "https://www.hebcal.com";

/// Default base URL for the reverse-geocoding service used for display names
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://api.bigdatacloud.net";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Zmanym/1.0";

/// Flags for the weekly endpoint: major, minor and modern holidays, Rosh
/// Chodesh, the current year, Shabbat Mevarchim, minor fasts and candle times.
const SHABBAT_FLAGS: [(&str, &str); 10] = [
    ("cfg", "json"),
    ("maj", "on"),
    ("min", "on"),
    ("mod", "on"),
    ("nx", "on"),
    ("year", "now"),
    ("month", "x"),
    ("ss", "on"),
    ("mf", "on"),
    ("c", "on"),
];

/// How a calendar request identifies its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    Geoname(String),
    PostalCode(String),
}

impl LocationQuery {
    /// Build a query from the facade's arguments. A postal-code record may
    /// carry its code separately or reuse the identifier.
    pub fn new(location_id: &str, is_postal_code: bool, postal_code: Option<&str>) -> Self {
        if is_postal_code {
            let code = postal_code
                .filter(|c| !c.is_empty())
                .unwrap_or(location_id);
            LocationQuery::PostalCode(code.to_string())
        } else {
            LocationQuery::Geoname(location_id.to_string())
        }
    }

    fn shabbat_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Geoname(id) => vec![("geo", "geoname".to_string()), ("geonameid", id.clone())],
            LocationQuery::PostalCode(zip) => vec![("zip", zip.clone())],
        }
    }

    fn zmanim_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Geoname(id) => vec![("geonameid", id.clone())],
            LocationQuery::PostalCode(zip) => vec![("zip", zip.clone())],
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Geoname(id) => write!(f, "geonameid {}", id),
            LocationQuery::PostalCode(zip) => write!(f, "zip {}", zip),
        }
    }
}

/// The outbound calls the rest of the crate needs. Each method performs a
/// single request and returns the raw JSON body.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Free-text place search.
    async fn search(&self, query: &str) -> Result<Value, ApiError>;

    /// Place lookup by coordinates.
    async fn reverse_lookup(&self, latitude: f64, longitude: f64) -> Result<Value, ApiError>;

    /// Weekly Shabbat and holiday items.
    async fn shabbat(&self, location: &LocationQuery) -> Result<Value, ApiError>;

    /// Daily halachic times for `date` (`YYYY-MM-DD`).
    async fn zmanim(&self, location: &LocationQuery, date: &str) -> Result<Value, ApiError>;

    /// City and country names for coordinates, used only for display.
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Value, ApiError>;
}

/// API client for Hebcal.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HebcalClient {
    client: Client,
    base_url: String,
    geocode_base_url: String,
}

impl HebcalClient {
    pub fn new(base_url: &str, geocode_base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            geocode_base_url: geocode_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            &config.geocode_base_url,
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!(url = %url, params = ?params, "GET");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{} returned invalid JSON: {}", url, e)))
    }
}

#[async_trait]
impl CalendarGateway for HebcalClient {
    async fn search(&self, query: &str) -> Result<Value, ApiError> {
        let url = format!("{}/complete.php", self.base_url);
        self.get_json(&url, &[("q", query.to_string()), ("geonames", "1".to_string())])
            .await
    }

    async fn reverse_lookup(&self, latitude: f64, longitude: f64) -> Result<Value, ApiError> {
        let url = format!("{}/complete.php", self.base_url);
        self.get_json(
            &url,
            &[
                ("geo", format!("{},{}", latitude, longitude)),
                ("v", "1".to_string()),
            ],
        )
        .await
    }

    async fn shabbat(&self, location: &LocationQuery) -> Result<Value, ApiError> {
        let url = format!("{}/shabbat", self.base_url);
        let mut params: Vec<(&str, String)> = SHABBAT_FLAGS
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        params.extend(location.shabbat_params());
        self.get_json(&url, &params).await
    }

    async fn zmanim(&self, location: &LocationQuery, date: &str) -> Result<Value, ApiError> {
        let url = format!("{}/zmanim", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("cfg", "json".to_string())];
        params.extend(location.zmanim_params());
        params.push(("date", date.to_string()));
        self.get_json(&url, &params).await
    }

    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Value, ApiError> {
        let url = format!("{}/data/reverse-geocode-client", self.geocode_base_url);
        self.get_json(
            &url,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ],
        )
        .await
    }
}
