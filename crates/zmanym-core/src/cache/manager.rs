use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::ShabbatSnapshot;
use crate::utils::format_age_minutes;

use super::store::KeyValueStore;

/// The weekly snapshot is refreshed once a day.
pub const WEEKLY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Daily zmanim for a fixed date do not change; keep them for a week.
pub const DERIVED_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Storage key of the single "current weekly snapshot" slot.
const WEEKLY_SLOT_KEY: &str = "zmanym_zmanim_cache";

/// Prefix for every keyed entry.
const KEYED_PREFIX: &str = "zmanym_cache_";

/// Key prefix of prefetched weekly snapshots.
const PREFETCH_PREFIX: &str = "shabbat_";

/// Key prefix of daily snapshots.
const DAILY_PREFIX: &str = "daily_zmanim_";

/// Source of "now", replaceable in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

fn age_of(written_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    // Future timestamps (clock skew) count as fresh
    now.signed_duration_since(written_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// A keyed cache record: `{ payload, writtenAt }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEntry<T> {
    pub payload: T,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub written_at: DateTime<Utc>,
}

impl<T> CachedEntry<T> {
    pub fn new(payload: T, written_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            written_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        age_of(self.written_at, now)
    }

    /// An entry is valid strictly before `ttl` has elapsed.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) >= ttl
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        format_age_minutes((self.age(now).as_secs() / 60) as i64)
    }
}

/// The weekly slot record:
/// `{ payload, writtenAt, locationId, displayName }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEntry {
    pub payload: ShabbatSnapshot,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub written_at: DateTime<Utc>,
    pub location_id: String,
    pub display_name: String,
}

impl WeeklyEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        age_of(self.written_at, now)
    }
}

/// Diagnostics for the weekly slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub has_cache: bool,
    pub age_minutes: Option<i64>,
    pub location: Option<String>,
    pub location_id: Option<String>,
}

impl CacheInfo {
    pub fn age_display(&self) -> String {
        self.age_minutes
            .map(format_age_minutes)
            .unwrap_or_else(|| "never".to_string())
    }
}

/// TTL-aware cache over a [`KeyValueStore`].
///
/// Nothing here returns an error: unreadable or corrupt entries are logged
/// and reported as a miss. Writes are last-writer-wins.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Key for the daily snapshot of a location on a date.
    pub fn daily_key(location_id: &str, date: &str) -> String {
        format!("{}{}_{}", DAILY_PREFIX, sanitize(location_id), sanitize(date))
    }

    /// Key for a weekly snapshot warmed by prefetching.
    pub fn prefetch_key(location_id: &str) -> String {
        format!("{}{}", PREFETCH_PREFIX, sanitize(location_id))
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", KEYED_PREFIX, key)
    }

    async fn read_raw(&self, storage_key: &str) -> Option<String> {
        match self.store.read(storage_key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = storage_key, error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    async fn write_raw(&self, storage_key: &str, contents: &str) {
        if let Err(e) = self.store.write(storage_key, contents).await {
            warn!(key = storage_key, error = %e, "Failed to write cache entry");
        }
    }

    async fn remove_raw(&self, storage_key: &str) {
        if let Err(e) = self.store.remove(storage_key).await {
            warn!(key = storage_key, error = %e, "Failed to remove cache entry");
        }
    }

    // ===== Weekly slot =====

    async fn load_weekly_entry(&self) -> Option<WeeklyEntry> {
        let raw = self.read_raw(WEEKLY_SLOT_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Corrupt weekly cache entry, ignoring");
                None
            }
        }
    }

    /// The stored weekly snapshot, if it belongs to `location_id` and is
    /// younger than [`WEEKLY_TTL`]. An expired entry is removed; an entry for
    /// another location is left in place.
    pub async fn load_weekly(&self, location_id: &str) -> Option<ShabbatSnapshot> {
        let Some(entry) = self.load_weekly_entry().await else {
            debug!("No cached weekly data");
            return None;
        };

        if entry.location_id != location_id {
            debug!(
                cached = %entry.location_id,
                requested = %location_id,
                "Cached weekly data is for a different location"
            );
            return None;
        }

        let age = entry.age(self.now());
        if age >= WEEKLY_TTL {
            debug!(age_hours = age.as_secs() / 3600, "Cached weekly data expired");
            self.clear_weekly().await;
            return None;
        }

        debug!(
            location = %entry.display_name,
            age_minutes = age.as_secs() / 60,
            "Using cached weekly data"
        );
        Some(entry.payload)
    }

    /// Replace the weekly slot, whatever location it held before.
    pub async fn save_weekly(&self, location_id: &str, display_name: &str, snapshot: &ShabbatSnapshot) {
        let entry = WeeklyEntry {
            payload: snapshot.clone(),
            written_at: self.now(),
            location_id: location_id.to_string(),
            display_name: display_name.to_string(),
        };
        match serde_json::to_string(&entry) {
            Ok(contents) => {
                self.write_raw(WEEKLY_SLOT_KEY, &contents).await;
                info!(location = %display_name, "Saved weekly data to cache");
            }
            Err(e) => warn!(error = %e, "Failed to serialize weekly cache entry"),
        }
    }

    pub async fn clear_weekly(&self) {
        self.remove_raw(WEEKLY_SLOT_KEY).await;
        debug!("Cleared weekly cache");
    }

    pub async fn has_valid_weekly(&self, location_id: &str) -> bool {
        self.load_weekly(location_id).await.is_some()
    }

    pub async fn cache_info(&self) -> CacheInfo {
        match self.load_weekly_entry().await {
            Some(entry) => CacheInfo {
                has_cache: true,
                age_minutes: Some((entry.age(self.now()).as_secs() / 60) as i64),
                location: Some(entry.display_name),
                location_id: Some(entry.location_id),
            },
            None => CacheInfo::default(),
        }
    }

    // ===== Keyed entries =====

    /// Read a keyed entry younger than `ttl`. Expired and corrupt entries
    /// are purged.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let storage_key = Self::storage_key(key);
        let raw = self.read_raw(&storage_key).await?;

        let entry: CachedEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt cache entry, removing");
                self.remove_raw(&storage_key).await;
                return None;
            }
        };

        if entry.is_expired(ttl, self.now()) {
            debug!(key = %key, "Cache entry expired, removing");
            self.remove_raw(&storage_key).await;
            return None;
        }

        Some(entry.payload)
    }

    pub async fn set<T: Serialize>(&self, key: &str, payload: &T) {
        let entry = CachedEntry::new(payload, self.now());
        match serde_json::to_string(&entry) {
            Ok(contents) => {
                self.write_raw(&Self::storage_key(key), &contents).await;
                debug!(key = %key, "Saved cache entry");
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize cache entry"),
        }
    }

    pub async fn invalidate(&self, key: &str) {
        self.remove_raw(&Self::storage_key(key)).await;
    }

    async fn keyed_storage_keys(&self) -> Vec<String> {
        match self.store.keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(KEYED_PREFIX))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list cache entries");
                Vec::new()
            }
        }
    }

    /// Remove every keyed entry. The weekly slot is untouched.
    pub async fn clear_all(&self) -> usize {
        let keys = self.keyed_storage_keys().await;
        for key in &keys {
            self.remove_raw(key).await;
        }
        info!(count = keys.len(), "Cleared keyed cache");
        keys.len()
    }

    /// Remove keyed entries older than `ttl` (or unreadable).
    pub async fn clear_expired(&self, ttl: Duration) -> usize {
        self.remove_expired(|_| ttl).await
    }

    /// Remove keyed entries past the TTL of their kind: [`WEEKLY_TTL`] for
    /// prefetched weekly snapshots, [`DERIVED_TTL`] for everything else.
    pub async fn prune(&self) -> usize {
        self.remove_expired(Self::ttl_for).await
    }

    fn ttl_for(key: &str) -> Duration {
        if key.starts_with(PREFETCH_PREFIX) {
            WEEKLY_TTL
        } else {
            DERIVED_TTL
        }
    }

    async fn remove_expired(&self, ttl_for: impl Fn(&str) -> Duration) -> usize {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Stamp {
            #[serde(with = "chrono::serde::ts_milliseconds")]
            written_at: DateTime<Utc>,
        }

        let now = self.now();
        let mut removed = 0;
        for storage_key in self.keyed_storage_keys().await {
            let Some(raw) = self.read_raw(&storage_key).await else {
                continue;
            };
            let key = storage_key.strip_prefix(KEYED_PREFIX).unwrap_or(storage_key.as_str());
            let expired = match serde_json::from_str::<Stamp>(&raw) {
                Ok(stamp) => age_of(stamp.written_at, now) >= ttl_for(key),
                Err(_) => true,
            };
            if expired {
                self.remove_raw(&storage_key).await;
                removed += 1;
            }
        }
        debug!(removed, "Pruned expired cache entries");
        removed
    }
}

/// Keep key parts within `[A-Za-z0-9-]`. Everything else, including `.`
/// and `_`, becomes `_`, so identifiers differing only in those characters
/// share a key. Geoname ids and postal codes never do.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::models::{HolidayEntry, UNAVAILABLE};
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn snapshot(location: &str) -> ShabbatSnapshot {
        ShabbatSnapshot {
            candle_lighting: "6:05pm".to_string(),
            havdalah: "7:03pm".to_string(),
            parsha: "Noach".to_string(),
            gregorian_date: "Friday, October 16, 2026".to_string(),
            hebrew_date: UNAVAILABLE.to_string(),
            location: location.to_string(),
            holidays: vec![HolidayEntry {
                title: "Rosh Chodesh Cheshvan".to_string(),
                date: "2026-10-22".to_string(),
                category: "roshchodesh".to_string(),
                candle_lighting: String::new(),
            }],
        }
    }

    /// A manager whose clock can be moved forward by the test.
    fn manager_with_clock() -> (CacheManager, Arc<MemoryStore>, Arc<Mutex<DateTime<Utc>>>) {
        let store = Arc::new(MemoryStore::new());
        let now = Arc::new(Mutex::new(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()));
        let clock_now = now.clone();
        let manager = CacheManager::new(store.clone())
            .with_clock(Arc::new(move || *clock_now.lock().unwrap()));
        (manager, store, now)
    }

    fn advance(now: &Arc<Mutex<DateTime<Utc>>>, hours: i64) {
        let mut guard = now.lock().unwrap();
        *guard += chrono::Duration::hours(hours);
    }

    #[tokio::test]
    async fn test_weekly_round_trip() {
        let (manager, _, _) = manager_with_clock();
        let original = snapshot("New York, United States");
        manager.save_weekly("5128581", "New York", &original).await;

        assert_eq!(manager.load_weekly("5128581").await, Some(original));
        assert!(manager.has_valid_weekly("5128581").await);
    }

    #[tokio::test]
    async fn test_weekly_expires_and_purges() {
        let (manager, store, now) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;

        advance(&now, 25);
        assert_eq!(manager.load_weekly("5128581").await, None);
        assert_eq!(store.read(WEEKLY_SLOT_KEY).await.unwrap(), None);
        assert!(!manager.cache_info().await.has_cache);
    }

    #[tokio::test]
    async fn test_weekly_still_valid_before_ttl() {
        let (manager, _, now) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;

        advance(&now, 23);
        assert!(manager.load_weekly("5128581").await.is_some());
    }

    #[tokio::test]
    async fn test_weekly_other_location_is_miss_without_mutation() {
        let (manager, store, _) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;
        let before = store.read(WEEKLY_SLOT_KEY).await.unwrap();

        assert_eq!(manager.load_weekly("281184").await, None);
        assert_eq!(store.read(WEEKLY_SLOT_KEY).await.unwrap(), before);
        assert!(manager.load_weekly("5128581").await.is_some());
    }

    #[tokio::test]
    async fn test_weekly_overwritten_by_new_location() {
        let (manager, _, _) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;
        manager.save_weekly("281184", "Jerusalem", &snapshot("Jerusalem, Israel")).await;

        assert_eq!(manager.load_weekly("5128581").await, None);
        assert_eq!(
            manager.load_weekly("281184").await.map(|s| s.location),
            Some("Jerusalem, Israel".to_string())
        );
    }

    #[tokio::test]
    async fn test_weekly_persisted_layout() {
        let (manager, store, _) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;

        let raw = store.read(WEEKLY_SLOT_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["locationId"], "5128581");
        assert_eq!(value["displayName"], "New York");
        assert_eq!(value["writtenAt"], 1_792_152_000_000i64);
        assert_eq!(value["payload"]["candleLighting"], "6:05pm");
    }

    #[tokio::test]
    async fn test_corrupt_weekly_is_miss() {
        let (manager, store, _) = manager_with_clock();
        store.write(WEEKLY_SLOT_KEY, "{not json").await.unwrap();
        assert_eq!(manager.load_weekly("5128581").await, None);
        assert_eq!(manager.cache_info().await, CacheInfo::default());
    }

    #[tokio::test]
    async fn test_cache_info() {
        let (manager, _, now) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;
        advance(&now, 2);

        let info = manager.cache_info().await;
        assert!(info.has_cache);
        assert_eq!(info.age_minutes, Some(120));
        assert_eq!(info.location.as_deref(), Some("New York"));
        assert_eq!(info.age_display(), "2h ago");
    }

    #[tokio::test]
    async fn test_keyed_round_trip_and_ttl() {
        let (manager, store, now) = manager_with_clock();
        let key = CacheManager::daily_key("5128581", "2026-10-16");
        manager.set(&key, &vec![1, 2, 3]).await;

        assert_eq!(manager.get::<Vec<i32>>(&key, DERIVED_TTL).await, Some(vec![1, 2, 3]));

        advance(&now, 24 * 7 + 1);
        assert_eq!(manager.get::<Vec<i32>>(&key, DERIVED_TTL).await, None);
        assert_eq!(
            store.read(&CacheManager::storage_key(&key)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_keyed_corrupt_entry_removed() {
        let (manager, store, _) = manager_with_clock();
        let storage_key = CacheManager::storage_key("shabbat_1");
        store.write(&storage_key, "[]").await.unwrap();

        assert_eq!(manager.get::<ShabbatSnapshot>("shabbat_1", WEEKLY_TTL).await, None);
        assert_eq!(store.read(&storage_key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (manager, _, _) = manager_with_clock();
        manager.set("shabbat_1", &"x").await;
        manager.invalidate("shabbat_1").await;
        assert_eq!(manager.get::<String>("shabbat_1", WEEKLY_TTL).await, None);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_weekly_and_preferences() {
        let (manager, store, _) = manager_with_clock();
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;
        manager.set("shabbat_1", &1).await;
        manager.set("shabbat_2", &2).await;
        store.write("zmanym_location", "{}").await.unwrap();

        assert_eq!(manager.clear_all().await, 2);
        assert!(manager.load_weekly("5128581").await.is_some());
        assert!(store.read("zmanym_location").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_expired() {
        let (manager, store, now) = manager_with_clock();
        manager.set("old", &1).await;
        advance(&now, 30);
        manager.set("new", &2).await;
        store
            .write(&CacheManager::storage_key("broken"), "nope")
            .await
            .unwrap();

        assert_eq!(manager.clear_expired(WEEKLY_TTL).await, 2);
        assert_eq!(manager.get::<i32>("new", WEEKLY_TTL).await, Some(2));
    }

    #[test]
    fn test_keys_are_sanitized() {
        assert_eq!(
            CacheManager::daily_key("5128581", "2026-10-16"),
            "daily_zmanim_5128581_2026-10-16"
        );
        assert_eq!(CacheManager::prefetch_key("zip 10001"), "shabbat_zip_10001");
        assert_eq!(CacheManager::daily_key("../x", "today"), "daily_zmanim____x_today");
    }

    #[test]
    fn test_key_alphabet() {
        assert_eq!(CacheManager::prefetch_key("AZ-85001"), "shabbat_AZ-85001");
        assert_eq!(CacheManager::prefetch_key("a.b"), "shabbat_a_b");
        assert_eq!(CacheManager::prefetch_key("a.b"), CacheManager::prefetch_key("a_b"));
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_consistent() {
        let (manager, store, now) = manager_with_clock();
        manager.set("shabbat_1", &1).await;
        manager.save_weekly("5128581", "New York", &snapshot("NY")).await;
        advance(&now, 24);

        // Exactly one TTL old: expired for reads and pruning alike
        assert_eq!(manager.get::<i32>("shabbat_1", WEEKLY_TTL).await, None);
        assert_eq!(manager.load_weekly("5128581").await, None);

        manager.set("shabbat_2", &2).await;
        advance(&now, 24);
        assert_eq!(manager.clear_expired(WEEKLY_TTL).await, 1);
        assert_eq!(store.read(&CacheManager::storage_key("shabbat_2")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prune_uses_ttl_per_kind() {
        let (manager, _, now) = manager_with_clock();
        let daily = CacheManager::daily_key("5128581", "2026-10-16");
        manager.set(&CacheManager::prefetch_key("5128581"), &1).await;
        manager.set(&daily, &2).await;
        advance(&now, 25);

        assert_eq!(manager.prune().await, 1);
        assert_eq!(manager.get::<i32>(&daily, DERIVED_TTL).await, Some(2));

        advance(&now, 24 * 6);
        assert_eq!(manager.prune().await, 1);
        assert_eq!(manager.get::<i32>(&daily, DERIVED_TTL).await, None);
    }

    #[test]
    fn test_cached_entry_age_display() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let entry = CachedEntry::new(1, now - chrono::Duration::minutes(5));
        assert_eq!(entry.age_display(now), "5m ago");
        assert!(!entry.is_expired(WEEKLY_TTL, now));

        let at_ttl = CachedEntry::new(1, now - chrono::Duration::hours(24));
        assert!(at_ttl.is_expired(WEEKLY_TTL, now));

        // Written in the future: treated as fresh
        let skewed = CachedEntry::new(1, now + chrono::Duration::minutes(5));
        assert_eq!(skewed.age_display(now), "just now");
    }
}
