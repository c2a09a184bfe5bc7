//! Persistent cache tier backed by Postgres
//!
//! Both logical tables are plain natural-key/value rows written with
//! `INSERT ... ON CONFLICT ... DO UPDATE`; the database's atomic upsert is
//! the only concurrent-write safety this design needs.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::{
    DomainError, GeoCacheEntry, GeoCacheRepository, RouteCacheKey, RouteCacheRepository,
    RouteEstimate,
};

#[derive(Debug, Clone)]
pub struct PostgresCacheRepository {
    pool: PgPool,
}

impl PostgresCacheRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, DomainError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to Postgres: {e}")))?;
        let repository = Self::new(pool);
        repository.ensure_schema().await?;
        Ok(repository)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the cache tables if they don't exist. Entries never expire,
    /// so there are no TTL columns.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS geo_cache (
                address_hash TEXT PRIMARY KEY,
                normalized_address TEXT NOT NULL,
                lat DOUBLE PRECISION NOT NULL,
                lng DOUBLE PRECISION NOT NULL,
                provider TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create geo_cache table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS route_cache (
                origin_lat6 BIGINT NOT NULL,
                origin_lng6 BIGINT NOT NULL,
                dest_lat6 BIGINT NOT NULL,
                dest_lng6 BIGINT NOT NULL,
                departure_bucket TEXT NOT NULL,
                duration_seconds BIGINT NOT NULL,
                distance_meters BIGINT NOT NULL,
                provider TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (origin_lat6, origin_lng6, dest_lat6, dest_lng6, departure_bucket)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create route_cache table: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl GeoCacheRepository for PostgresCacheRepository {
    async fn get_by_hash(&self, hash: &str) -> Result<Option<GeoCacheEntry>, DomainError> {
        let row = sqlx::query(
            "SELECT normalized_address, lat, lng, provider \
             FROM geo_cache WHERE address_hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("geo_cache select failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let provider: String = row
            .try_get("provider")
            .map_err(|e| DomainError::storage(format!("geo_cache row decode failed: {e}")))?;

        Ok(Some(GeoCacheEntry {
            normalized_address: row
                .try_get("normalized_address")
                .map_err(|e| DomainError::storage(format!("geo_cache row decode failed: {e}")))?,
            lat: row
                .try_get("lat")
                .map_err(|e| DomainError::storage(format!("geo_cache row decode failed: {e}")))?,
            lng: row
                .try_get("lng")
                .map_err(|e| DomainError::storage(format!("geo_cache row decode failed: {e}")))?,
            source: provider.parse()?,
        }))
    }

    async fn upsert(&self, hash: &str, entry: &GeoCacheEntry) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO geo_cache (address_hash, normalized_address, lat, lng, provider) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (address_hash) DO UPDATE SET \
                 normalized_address = EXCLUDED.normalized_address, \
                 lat = EXCLUDED.lat, \
                 lng = EXCLUDED.lng, \
                 provider = EXCLUDED.provider, \
                 updated_at = NOW()",
        )
        .bind(hash)
        .bind(&entry.normalized_address)
        .bind(entry.lat)
        .bind(entry.lng)
        .bind(entry.source.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("geo_cache upsert failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl RouteCacheRepository for PostgresCacheRepository {
    async fn get(&self, key: &RouteCacheKey) -> Result<Option<RouteEstimate>, DomainError> {
        let row = sqlx::query(
            "SELECT duration_seconds, distance_meters, provider \
             FROM route_cache \
             WHERE origin_lat6 = $1 AND origin_lng6 = $2 \
               AND dest_lat6 = $3 AND dest_lng6 = $4 \
               AND departure_bucket = $5",
        )
        .bind(key.origin_lat6)
        .bind(key.origin_lng6)
        .bind(key.dest_lat6)
        .bind(key.dest_lng6)
        .bind(&key.departure_bucket)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("route_cache select failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let provider: String = row
            .try_get("provider")
            .map_err(|e| DomainError::storage(format!("route_cache row decode failed: {e}")))?;

        Ok(Some(RouteEstimate {
            duration_seconds: row
                .try_get("duration_seconds")
                .map_err(|e| DomainError::storage(format!("route_cache row decode failed: {e}")))?,
            distance_meters: row
                .try_get("distance_meters")
                .map_err(|e| DomainError::storage(format!("route_cache row decode failed: {e}")))?,
            source: provider.parse()?,
        }))
    }

    async fn upsert(
        &self,
        key: &RouteCacheKey,
        value: &RouteEstimate,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO route_cache \
                 (origin_lat6, origin_lng6, dest_lat6, dest_lng6, departure_bucket, \
                  duration_seconds, distance_meters, provider) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (origin_lat6, origin_lng6, dest_lat6, dest_lng6, departure_bucket) \
             DO UPDATE SET \
                 duration_seconds = EXCLUDED.duration_seconds, \
                 distance_meters = EXCLUDED.distance_meters, \
                 provider = EXCLUDED.provider, \
                 updated_at = NOW()",
        )
        .bind(key.origin_lat6)
        .bind(key.origin_lng6)
        .bind(key.dest_lat6)
        .bind(key.dest_lng6)
        .bind(&key.departure_bucket)
        .bind(value.duration_seconds)
        .bind(value.distance_meters)
        .bind(value.source.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("route_cache upsert failed: {e}")))?;

        Ok(())
    }
}
