//! The facade front-ends talk to.
//!
//! `ZmanymClient` ties together the gateway, the normalizer, the cache and
//! the location resolver. Cached data is served without touching the
//! network; only gateway failures and unusable payloads surface as errors.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{CalendarGateway, LocationQuery};
use crate::cache::manager::{DERIVED_TTL, WEEKLY_TTL};
use crate::cache::CacheManager;
use crate::error::ZmanymError;
use crate::location::{LocationResolver, SupportedRegion};
use crate::models::calendar::ShabbatResponse;
use crate::models::{DailyTimesSnapshot, LocationRecord, ShabbatSnapshot};
use crate::normalize::{normalize_daily, normalize_shabbat};

/// Number of search results warmed by [`ZmanymClient::prefetch_shabbat_times`].
const PREFETCH_LIMIT: usize = 3;

/// Concurrent requests while prefetching.
const PREFETCH_CONCURRENCY: usize = 3;

/// Clone is cheap: every field is reference-counted.
#[derive(Clone)]
pub struct ZmanymClient {
    gateway: Arc<dyn CalendarGateway>,
    cache: CacheManager,
    resolver: LocationResolver,
}

impl ZmanymClient {
    pub fn new(gateway: Arc<dyn CalendarGateway>, cache: CacheManager, region: SupportedRegion) -> Self {
        let resolver = LocationResolver::new(gateway.clone(), region);
        Self {
            gateway,
            cache,
            resolver,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn region(&self) -> &SupportedRegion {
        self.resolver.region()
    }

    pub async fn search_location(&self, query: &str) -> Result<Vec<LocationRecord>, ZmanymError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.resolver.search(query).await.map_err(ZmanymError::Search)
    }

    /// Weekly Shabbat and holiday times for a location.
    ///
    /// Served from the weekly slot when it holds a fresh snapshot for the
    /// same location, then from a prefetched snapshot, and only then from the
    /// network. Whatever is returned becomes the new weekly slot.
    pub async fn get_shabbat_times(
        &self,
        location_id: &str,
        display_name: Option<&str>,
        is_postal_code: bool,
        postal_code: Option<&str>,
    ) -> Result<ShabbatSnapshot, ZmanymError> {
        if let Some(snapshot) = self.cache.load_weekly(location_id).await {
            return Ok(snapshot);
        }

        let prefetch_key = CacheManager::prefetch_key(location_id);
        if let Some(snapshot) = self
            .cache
            .get::<ShabbatSnapshot>(&prefetch_key, WEEKLY_TTL)
            .await
        {
            debug!(location_id = %location_id, "Using prefetched weekly snapshot");
            self.save_weekly(location_id, display_name, &snapshot).await;
            return Ok(snapshot);
        }

        let query = LocationQuery::new(location_id, is_postal_code, postal_code);
        let snapshot = self.fetch_shabbat(&query).await?;
        self.save_weekly(location_id, display_name, &snapshot).await;
        Ok(snapshot)
    }

    /// Daily zmanim for a location. `date` is `YYYY-MM-DD`; `None` means
    /// today (UTC).
    pub async fn get_daily_times(
        &self,
        location_id: &str,
        date: Option<&str>,
        is_postal_code: bool,
        postal_code: Option<&str>,
    ) -> Result<DailyTimesSnapshot, ZmanymError> {
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => date.to_string(),
            None => Utc::now().format("%Y-%m-%d").to_string(),
        };

        let key = CacheManager::daily_key(location_id, &date);
        if let Some(snapshot) = self.cache.get::<DailyTimesSnapshot>(&key, DERIVED_TTL).await {
            return Ok(snapshot);
        }

        let query = LocationQuery::new(location_id, is_postal_code, postal_code);
        info!(location = %query, date = %date, "Fetching daily zmanim");
        let payload = self
            .gateway
            .zmanim(&query, &date)
            .await
            .map_err(ZmanymError::Fetch)?;

        if !payload.is_object() {
            return Err(ZmanymError::MalformedResponse(format!(
                "daily zmanim for {} is not an object",
                query
            )));
        }

        let snapshot = normalize_daily(&payload, &date);
        self.cache.set(&key, &snapshot).await;
        Ok(snapshot)
    }

    pub async fn resolve_from_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ZmanymError> {
        self.resolver
            .resolve_from_coordinates(latitude, longitude)
            .await
    }

    pub async fn describe_coordinates(&self, latitude: f64, longitude: f64) -> String {
        self.resolver.describe_coordinates(latitude, longitude).await
    }

    /// Warm the cache for the first few search results in the background.
    ///
    /// Failures are logged and dropped. The handle may be awaited or
    /// discarded.
    pub fn prefetch_shabbat_times(&self, records: &[LocationRecord]) -> JoinHandle<()> {
        let client = self.clone();
        let records: Vec<LocationRecord> = records.iter().take(PREFETCH_LIMIT).cloned().collect();

        tokio::spawn(async move {
            debug!(count = records.len(), "Prefetching weekly times");

            stream::iter(records)
                .map(|record| {
                    let client = client.clone();
                    async move {
                        let result = client.prefetch_one(&record).await;
                        (record.id, result)
                    }
                })
                .buffer_unordered(PREFETCH_CONCURRENCY)
                .for_each(|(location_id, result)| async move {
                    if let Err(e) = result {
                        warn!(location_id = %location_id, error = %e, "Prefetch failed");
                    }
                })
                .await;
        })
    }

    async fn prefetch_one(&self, record: &LocationRecord) -> Result<(), ZmanymError> {
        let key = CacheManager::prefetch_key(&record.id);
        if self.cache.has_valid_weekly(&record.id).await
            || self.cache.get::<ShabbatSnapshot>(&key, WEEKLY_TTL).await.is_some()
        {
            debug!(location_id = %record.id, "Already cached, skipping prefetch");
            return Ok(());
        }

        let query = LocationQuery::new(
            &record.id,
            record.is_postal_code,
            record.postal_code.as_deref(),
        );
        let snapshot = self.fetch_shabbat(&query).await?;
        self.cache.set(&key, &snapshot).await;
        Ok(())
    }

    async fn fetch_shabbat(&self, query: &LocationQuery) -> Result<ShabbatSnapshot, ZmanymError> {
        info!(location = %query, "Fetching weekly times");
        let payload: Value = self
            .gateway
            .shabbat(query)
            .await
            .map_err(ZmanymError::Fetch)?;

        let response = ShabbatResponse::from_payload(&payload).ok_or_else(|| {
            ZmanymError::MalformedResponse(format!("weekly times for {} is not an object", query))
        })?;
        Ok(normalize_shabbat(&response))
    }

    async fn save_weekly(&self, location_id: &str, display_name: Option<&str>, snapshot: &ShabbatSnapshot) {
        let name = display_name
            .filter(|n| !n.is_empty())
            .unwrap_or(&snapshot.location);
        self.cache.save_weekly(location_id, name, snapshot).await;
    }
}
