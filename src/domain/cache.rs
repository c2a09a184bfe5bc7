//! Cache entry types and the persistent-tier repository seams.
//!
//! Entries carry no TTL: a cached geocode lives until its row is deleted.
//! Stale addresses (a business that moved) are never refreshed
//! automatically; this is a known limitation carried over from the original
//! design.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::geocode::GeocodeSource;
use super::route::{RouteCacheKey, RouteEstimate};
use super::DomainError;

/// A cached geocode, keyed by address hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCacheEntry {
    pub normalized_address: String,
    pub lat: f64,
    pub lng: f64,
    pub source: GeocodeSource,
}

/// Persistent geo-cache table: select by address hash (at most one row),
/// upsert with the hash as conflict target.
#[async_trait]
pub trait GeoCacheRepository: Send + Sync {
    async fn get_by_hash(&self, hash: &str) -> Result<Option<GeoCacheEntry>, DomainError>;

    async fn upsert(&self, hash: &str, entry: &GeoCacheEntry) -> Result<(), DomainError>;
}

/// Persistent route-cache table, keyed by the quantized composite key.
#[async_trait]
pub trait RouteCacheRepository: Send + Sync {
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<RouteEstimate>, DomainError>;

    async fn upsert(&self, key: &RouteCacheKey, value: &RouteEstimate)
        -> Result<(), DomainError>;
}
