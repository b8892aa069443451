//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! normalized snapshots on top of a pluggable `KeyValueStore`. Entries are
//! JSON records stamped with their write time:
//!
//! - the current weekly Shabbat snapshot (one slot, 24 hour TTL)
//! - daily zmanim snapshots keyed by location and date (7 day TTL)
//! - weekly snapshots warmed by prefetching (24 hour TTL)

pub mod manager;
pub mod store;

pub use manager::{CacheInfo, CacheManager, CachedEntry, WeeklyEntry, DERIVED_TTL, WEEKLY_TTL};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
