//! Two-tier cache store
//!
//! Memory is checked first and is authoritative for the process lifetime;
//! the persistent tier is best-effort. Persistent-store failures are logged
//! and swallowed here so resolvers only ever see "cached" or "not cached",
//! never a cache error. When no persistent repository is configured the
//! store degrades to memory-only.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{
    GeoCacheEntry, GeoCacheRepository, RouteCacheKey, RouteCacheRepository, RouteEstimate,
};

use super::memory::MemoryCache;

/// The persistent tier, when configured. One backend serves both logical
/// tables.
pub trait PersistentCache: GeoCacheRepository + RouteCacheRepository {}

impl<T: GeoCacheRepository + RouteCacheRepository> PersistentCache for T {}

pub struct TieredCacheStore {
    memory: MemoryCache,
    persistent: Option<Arc<dyn PersistentCache>>,
}

impl TieredCacheStore {
    pub fn new(persistent: Option<Arc<dyn PersistentCache>>) -> Self {
        Self {
            memory: MemoryCache::new(),
            persistent,
        }
    }

    pub fn memory_only() -> Self {
        Self::new(None)
    }

    /// Geocode lookup by address hash: memory first, then the persistent
    /// tier. A persistent hit populates the memory tier before returning.
    pub async fn get_geo(&self, hash: &str) -> Option<GeoCacheEntry> {
        if let Some(entry) = self.memory.get_geo(hash).await {
            return Some(entry);
        }

        let persistent = self.persistent.as_ref()?;
        match persistent.get_by_hash(hash).await {
            Ok(Some(entry)) => {
                self.memory.put_geo(hash, entry.clone()).await;
                Some(entry)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("geo cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    /// Writes to memory immediately and upserts the persistent tier
    /// best-effort (conflict on hash overwrites).
    pub async fn put_geo(&self, hash: &str, entry: GeoCacheEntry) {
        self.memory.put_geo(hash, entry.clone()).await;

        if let Some(persistent) = &self.persistent {
            if let Err(e) = GeoCacheRepository::upsert(persistent.as_ref(), hash, &entry).await {
                warn!("geo cache upsert failed, memory tier still serves: {e}");
            }
        }
    }

    pub async fn get_route(&self, key: &RouteCacheKey) -> Option<RouteEstimate> {
        if let Some(value) = self.memory.get_route(key).await {
            return Some(value);
        }

        let persistent = self.persistent.as_ref()?;
        match RouteCacheRepository::get(persistent.as_ref(), key).await {
            Ok(Some(value)) => {
                self.memory.put_route(key.clone(), value).await;
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("route cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    pub async fn put_route(&self, key: RouteCacheKey, value: RouteEstimate) {
        self.memory.put_route(key.clone(), value).await;

        if let Some(persistent) = &self.persistent {
            if let Err(e) = RouteCacheRepository::upsert(persistent.as_ref(), &key, &value).await {
                warn!("route cache upsert failed, memory tier still serves: {e}");
            }
        }
    }
}
