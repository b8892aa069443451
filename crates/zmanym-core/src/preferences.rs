//! Saved-location preference.
//!
//! Stored as a single JSON record next to the cache entries. Like the cache,
//! failures are logged and otherwise ignored.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::KeyValueStore;
use crate::models::SavedLocation;

const LOCATION_KEY: &str = "zmanym_location";

#[derive(Clone)]
pub struct LocationPreferences {
    store: Arc<dyn KeyValueStore>,
}

impl LocationPreferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, location: &SavedLocation) {
        let contents = match serde_json::to_string(location) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to serialize saved location");
                return;
            }
        };
        match self.store.write(LOCATION_KEY, &contents).await {
            Ok(()) => debug!(location = %location.display_name, "Saved location"),
            Err(e) => warn!(error = %e, "Failed to save location"),
        }
    }

    pub async fn load(&self) -> Option<SavedLocation> {
        let raw = match self.store.read(LOCATION_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read saved location");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(location) => Some(location),
            Err(e) => {
                warn!(error = %e, "Corrupt saved location, ignoring");
                None
            }
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(LOCATION_KEY).await {
            warn!(error = %e, "Failed to clear saved location");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::models::Coordinates;

    fn jerusalem() -> SavedLocation {
        SavedLocation {
            display_name: "Jerusalem, Israel".to_string(),
            coordinates: Some(Coordinates::new(31.76904, 35.21633)),
            location_id: "281184".to_string(),
            is_postal_code: None,
            postal_code: None,
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let prefs = LocationPreferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.load().await, None);

        prefs.save(&jerusalem()).await;
        assert_eq!(prefs.load().await, Some(jerusalem()));

        prefs.clear().await;
        assert_eq!(prefs.load().await, None);
    }

    #[tokio::test]
    async fn test_corrupt_record_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.write(LOCATION_KEY, "{\"displayName\": 3}").await.unwrap();
        let prefs = LocationPreferences::new(store);
        assert_eq!(prefs.load().await, None);
    }
}
