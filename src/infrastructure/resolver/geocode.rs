//! Geocode resolution
//!
//! Normalize → cache lookup → rate-limit check → provider loop → persist.
//! Providers are tried strictly in priority order and candidate queries
//! strictly in the order the builder produced them, stopping at the first
//! hit that passes the coordinate policy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::address::{address_hash, candidate_queries};
use crate::domain::coords::{is_usable_job_coords, normalize_address_text};
use crate::domain::{
    DomainError, GeoCacheEntry, GeocodeHit, GeocodeProvider, GeocodeResult, GeocodeSource,
};
use crate::infrastructure::cache::TieredCacheStore;
use crate::infrastructure::rate_limit::FixedWindowRateLimiter;

const RATE_LIMIT_SCOPE: &str = "geocode";

/// Runs the candidate queries against each provider in priority order and
/// returns the first hit with usable coordinates. Shared by the HTTP
/// resolver and the batch backfill (which calls it without the rate
/// limiter or the HTTP layer).
///
/// `Ok(None)` means every provider answered and none matched; an `Err`
/// means at least one provider call failed along the way and no usable
/// result was found. Unusable hits — (0,0), out-of-region — are skipped
/// and never cached.
pub async fn resolve_candidates(
    providers: &[Arc<dyn GeocodeProvider>],
    candidates: &[String],
) -> Result<Option<(GeocodeHit, GeocodeSource)>, DomainError> {
    let mut last_error: Option<DomainError> = None;

    for provider in providers {
        for candidate in candidates {
            match provider.lookup(candidate).await {
                Ok(Some(hit)) => {
                    if is_usable_job_coords(hit.lat, hit.lng) {
                        debug!(
                            provider = provider.source().as_str(),
                            query = candidate.as_str(),
                            "geocode hit"
                        );
                        return Ok(Some((hit, provider.source())));
                    }
                    debug!(
                        provider = provider.source().as_str(),
                        query = candidate.as_str(),
                        lat = hit.lat,
                        lng = hit.lng,
                        "discarding unusable coordinates"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        provider = provider.source().as_str(),
                        query = candidate.as_str(),
                        "provider call failed: {e}"
                    );
                    last_error = Some(e);
                }
            }
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

pub struct GeocodeResolver {
    cache: Arc<TieredCacheStore>,
    limiter: Arc<FixedWindowRateLimiter>,
    providers: Vec<Arc<dyn GeocodeProvider>>,
    rate_limit: u32,
    rate_window: Duration,
}

impl GeocodeResolver {
    pub fn new(
        cache: Arc<TieredCacheStore>,
        limiter: Arc<FixedWindowRateLimiter>,
        providers: Vec<Arc<dyn GeocodeProvider>>,
        rate_limit: u32,
        rate_window: Duration,
    ) -> Self {
        Self {
            cache,
            limiter,
            providers,
            rate_limit,
            rate_window,
        }
    }

    /// Resolves a free-text address to usable coordinates.
    ///
    /// Cache hits return immediately tagged `cache` and are exempt from
    /// rate limiting; only cache misses consume the per-IP window before
    /// any outbound provider call.
    pub async fn geocode(
        &self,
        address_text: &str,
        client_ip: &str,
    ) -> Result<GeocodeResult, DomainError> {
        let normalized = normalize_address_text(address_text);
        if normalized.is_empty() {
            return Err(DomainError::validation("addressText is required"));
        }

        let hash = address_hash(&normalized);
        if let Some(entry) = self.cache.get_geo(&hash).await {
            if is_usable_job_coords(entry.lat, entry.lng) {
                return Ok(GeocodeResult {
                    lat: entry.lat,
                    lng: entry.lng,
                    normalized_address: entry.normalized_address,
                    resolved_address: None,
                    source: GeocodeSource::Cache,
                });
            }
        }

        let decision =
            self.limiter
                .check(RATE_LIMIT_SCOPE, client_ip, self.rate_limit, self.rate_window);
        if !decision.allowed {
            return Err(DomainError::rate_limited(decision.retry_after_seconds));
        }

        let candidates = candidate_queries(&normalized);
        let resolved = resolve_candidates(&self.providers, &candidates).await?;

        let Some((hit, source)) = resolved else {
            return Err(DomainError::not_found(format!(
                "no provider matched address: {normalized}"
            )));
        };

        self.cache
            .put_geo(
                &hash,
                GeoCacheEntry {
                    normalized_address: normalized.clone(),
                    lat: hit.lat,
                    lng: hit.lng,
                    source,
                },
            )
            .await;

        Ok(GeocodeResult {
            lat: hit.lat,
            lng: hit.lng,
            normalized_address: normalized,
            resolved_address: hit.resolved_address,
            source,
        })
    }
}
