//! Process-local cache tier
//!
//! Built on moka without a TTL: entries live until process restart,
//! matching the no-expiry contract of the persistent tier. Concurrent
//! read-then-write races are acceptable since all writes for the same key
//! carry equivalent, re-derivable data.

use moka::future::Cache;

use crate::domain::{GeoCacheEntry, RouteCacheKey, RouteEstimate};

const MAX_ENTRIES: u64 = 100_000;

/// In-process geocode and route caches.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    geo: Cache<String, GeoCacheEntry>,
    route: Cache<RouteCacheKey, RouteEstimate>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            geo: Cache::builder().max_capacity(MAX_ENTRIES).build(),
            route: Cache::builder().max_capacity(MAX_ENTRIES).build(),
        }
    }

    pub async fn get_geo(&self, hash: &str) -> Option<GeoCacheEntry> {
        self.geo.get(hash).await
    }

    pub async fn put_geo(&self, hash: &str, entry: GeoCacheEntry) {
        self.geo.insert(hash.to_string(), entry).await;
    }

    pub async fn get_route(&self, key: &RouteCacheKey) -> Option<RouteEstimate> {
        self.route.get(key).await
    }

    pub async fn put_route(&self, key: RouteCacheKey, value: RouteEstimate) {
        self.route.insert(key, value).await;
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, GeocodeSource, RouteSource};

    fn sample_entry() -> GeoCacheEntry {
        GeoCacheEntry {
            normalized_address: "הרצל 10, אשדוד".to_string(),
            lat: 31.79,
            lng: 34.65,
            source: GeocodeSource::Nominatim,
        }
    }

    #[tokio::test]
    async fn test_geo_round_trip() {
        let cache = MemoryCache::new();
        cache.put_geo("abc123", sample_entry()).await;
        assert_eq!(cache.get_geo("abc123").await, Some(sample_entry()));
        assert!(cache.get_geo("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_geo_last_write_wins() {
        let cache = MemoryCache::new();
        cache.put_geo("abc123", sample_entry()).await;
        let updated = GeoCacheEntry {
            lat: 31.8,
            ..sample_entry()
        };
        cache.put_geo("abc123", updated.clone()).await;
        assert_eq!(cache.get_geo("abc123").await, Some(updated));
    }

    #[tokio::test]
    async fn test_route_round_trip() {
        let cache = MemoryCache::new();
        let key = RouteCacheKey::new(
            Coordinates::new(32.0, 34.78),
            Coordinates::new(32.05, 34.76),
            "2024-05-17T09:30:00Z".to_string(),
        );
        let estimate = RouteEstimate {
            duration_seconds: 540,
            distance_meters: 6200,
            source: RouteSource::Osrm,
        };
        cache.put_route(key.clone(), estimate).await;
        assert_eq!(cache.get_route(&key).await, Some(estimate));
    }
}
