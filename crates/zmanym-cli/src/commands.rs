//! Command handlers.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use zmanym_core::models::{Coordinates, SavedLocation};
use zmanym_core::{LocationPreferences, ZmanymClient};

use crate::render;

/// Search results shown per query.
const MAX_RESULTS: usize = 5;

/// The place a calendar command runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub location_id: String,
    pub display_name: Option<String>,
    pub is_postal_code: bool,
    pub postal_code: Option<String>,
}

impl Target {
    /// Explicit flags win over the saved location.
    pub fn choose(id: Option<String>, zip: Option<String>, saved: Option<SavedLocation>) -> Option<Self> {
        if let Some(zip) = zip {
            return Some(Self {
                location_id: zip.clone(),
                display_name: None,
                is_postal_code: true,
                postal_code: Some(zip),
            });
        }
        if let Some(id) = id {
            return Some(Self {
                location_id: id,
                display_name: None,
                is_postal_code: false,
                postal_code: None,
            });
        }
        saved.map(|saved| Self {
            is_postal_code: saved.is_postal_code(),
            location_id: saved.location_id,
            display_name: Some(saved.display_name),
            postal_code: saved.postal_code,
        })
    }
}

pub struct App {
    client: ZmanymClient,
    preferences: LocationPreferences,
    json: bool,
}

impl App {
    pub fn new(client: ZmanymClient, preferences: LocationPreferences, json: bool) -> Self {
        Self {
            client,
            preferences,
            json,
        }
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    async fn target(&self, id: Option<String>, zip: Option<String>) -> Result<Target> {
        let saved = if id.is_none() && zip.is_none() {
            self.preferences.load().await
        } else {
            None
        };
        Target::choose(id, zip, saved).context(
            "No location given and none saved. Pass --id or --zip, or run `zmanym location set <query>`",
        )
    }

    pub async fn search(&self, query: &[String]) -> Result<()> {
        let mut results = self.client.search_location(&query.join(" ")).await?;
        results.truncate(MAX_RESULTS);

        // Warm the cache so picking one of these is instant
        let prefetch = self.client.prefetch_shabbat_times(&results);

        self.print(&results, || render::records(&results))?;

        if let Err(e) = prefetch.await {
            debug!(error = %e, "Prefetch task did not complete");
        }
        Ok(())
    }

    pub async fn shabbat(&self, id: Option<String>, name: Option<String>, zip: Option<String>) -> Result<()> {
        let target = self.target(id, zip).await?;
        let display_name = name.or(target.display_name);
        let snapshot = self
            .client
            .get_shabbat_times(
                &target.location_id,
                display_name.as_deref(),
                target.is_postal_code,
                target.postal_code.as_deref(),
            )
            .await?;
        self.print(&snapshot, || render::shabbat(&snapshot))
    }

    pub async fn daily(&self, id: Option<String>, zip: Option<String>, date: Option<String>) -> Result<()> {
        if let Some(ref date) = date {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
        }
        let target = self.target(id, zip).await?;
        let snapshot = self
            .client
            .get_daily_times(
                &target.location_id,
                date.as_deref(),
                target.is_postal_code,
                target.postal_code.as_deref(),
            )
            .await?;
        self.print(&snapshot, || render::daily(&snapshot))
    }

    pub async fn locate(&self, latitude: f64, longitude: f64, save: bool) -> Result<()> {
        let coordinates = Coordinates::new(latitude, longitude);
        if !coordinates.is_valid() {
            bail!("Coordinates out of range: {}, {}", latitude, longitude);
        }

        let location_id = self.client.resolve_from_coordinates(latitude, longitude).await?;
        let display_name = self.client.describe_coordinates(latitude, longitude).await;

        let location = SavedLocation {
            display_name,
            coordinates: Some(coordinates),
            location_id,
            is_postal_code: None,
            postal_code: None,
        };
        if save {
            self.preferences.save(&location).await;
        }
        self.print(&location, || render::saved_location(Some(&location)))
    }

    pub async fn show_location(&self) -> Result<()> {
        let location = self.preferences.load().await;
        self.print(&location, || render::saved_location(location.as_ref()))
    }

    pub async fn clear_location(&self) -> Result<()> {
        self.preferences.clear().await;
        if !self.json {
            println!("Saved location cleared.");
        }
        Ok(())
    }

    pub async fn set_location(&self, query: &[String]) -> Result<()> {
        let query = query.join(" ");
        let results = self.client.search_location(&query).await?;
        let Some(record) = results.first() else {
            bail!("No locations found for '{}'", query);
        };
        let location = SavedLocation::from_record(record);
        self.preferences.save(&location).await;
        self.print(&location, || render::saved_location(Some(&location)))
    }

    pub async fn cache_info(&self) -> Result<()> {
        let info = self.client.cache().cache_info().await;
        self.print(&info, || render::cache_info(&info))
    }

    pub async fn clear_cache(&self) -> Result<()> {
        let cache = self.client.cache();
        cache.clear_weekly().await;
        let removed = cache.clear_all().await;
        self.print(&serde_json::json!({ "removed": removed }), || {
            format!("Cleared weekly data and {} cached entries.\n", removed)
        })
    }

    pub async fn prune_cache(&self) -> Result<()> {
        let removed = self.client.cache().prune().await;
        self.print(&serde_json::json!({ "removed": removed }), || {
            format!("Removed {} expired entries.\n", removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> SavedLocation {
        SavedLocation {
            display_name: "Miami, FL 33101".to_string(),
            coordinates: None,
            location_id: "33101".to_string(),
            is_postal_code: Some(true),
            postal_code: Some("33101".to_string()),
        }
    }

    #[test]
    fn test_target_prefers_flags() {
        let target = Target::choose(None, Some("10001".to_string()), Some(saved())).unwrap();
        assert_eq!(target.location_id, "10001");
        assert!(target.is_postal_code);
        assert_eq!(target.display_name, None);

        let target = Target::choose(Some("281184".to_string()), None, Some(saved())).unwrap();
        assert_eq!(target.location_id, "281184");
        assert!(!target.is_postal_code);
    }

    #[test]
    fn test_target_falls_back_to_saved() {
        let target = Target::choose(None, None, Some(saved())).unwrap();
        assert_eq!(target.location_id, "33101");
        assert!(target.is_postal_code);
        assert_eq!(target.display_name.as_deref(), Some("Miami, FL 33101"));

        assert_eq!(Target::choose(None, None, None), None);
    }
}
