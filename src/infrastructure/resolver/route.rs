//! Route resolution
//!
//! Quantize → cache lookup → routing provider → haversine fallback →
//! persist. The fallback result is cached deliberately: an unreachable
//! provider should not be retried on every request within the same
//! 30-minute/coordinate bucket, only once the bucket rolls over.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::route::{departure_bucket_iso, fallback_estimate};
use crate::domain::{
    Coordinates, DomainError, RouteCacheKey, RouteEstimate, RouteSource, RoutingProvider,
};
use crate::infrastructure::cache::TieredCacheStore;

pub struct RouteResolver {
    cache: Arc<TieredCacheStore>,
    provider: Arc<dyn RoutingProvider>,
}

impl RouteResolver {
    pub fn new(cache: Arc<TieredCacheStore>, provider: Arc<dyn RoutingProvider>) -> Self {
        Self { cache, provider }
    }

    /// Estimates driving duration/distance between two points.
    ///
    /// Never fails beyond input validation: provider failures and
    /// non-positive provider values degrade to the haversine fallback,
    /// tagged with its provenance.
    pub async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        departure_time: Option<DateTime<Utc>>,
    ) -> Result<RouteEstimate, DomainError> {
        if !origin.is_finite() || !destination.is_finite() {
            return Err(DomainError::validation(
                "origin and destination must have finite lat/lng",
            ));
        }

        let bucket = departure_bucket_iso(departure_time);
        let key = RouteCacheKey::new(origin, destination, bucket);

        if let Some(cached) = self.cache.get_route(&key).await {
            return Ok(cached);
        }

        // Provider sees the quantized coordinates, same as the cache key.
        let origin_q = key.origin();
        let destination_q = key.destination();

        let estimate = match self.provider.drive(origin_q, destination_q).await {
            Ok(leg) if leg.duration_seconds > 0.0 && leg.distance_meters > 0.0 => RouteEstimate {
                duration_seconds: leg.duration_seconds.round() as i64,
                distance_meters: leg.distance_meters.round() as i64,
                source: RouteSource::Osrm,
            },
            Ok(leg) => {
                warn!(
                    duration = leg.duration_seconds,
                    distance = leg.distance_meters,
                    "routing provider returned non-positive values, using fallback"
                );
                fallback_estimate(origin_q, destination_q)
            }
            Err(e) => {
                warn!("routing provider failed, using fallback: {e}");
                fallback_estimate(origin_q, destination_q)
            }
        };

        self.cache.put_route(key, estimate).await;
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;
    use mockall::mock;

    use super::*;
    use crate::domain::route::haversine_meters;
    use crate::domain::RouteLeg;

    mock! {
        Router {}

        #[async_trait]
        impl RoutingProvider for Router {
            async fn drive(
                &self,
                origin: Coordinates,
                destination: Coordinates,
            ) -> Result<RouteLeg, DomainError>;
        }
    }

    fn origin() -> Coordinates {
        Coordinates::new(32.0, 34.78)
    }

    fn destination() -> Coordinates {
        Coordinates::new(32.05, 34.76)
    }

    fn departure() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 5, 17, 9, 40, 0).unwrap())
    }

    fn resolver(provider: MockRouter) -> RouteResolver {
        RouteResolver::new(Arc::new(TieredCacheStore::memory_only()), Arc::new(provider))
    }

    #[tokio::test]
    async fn test_non_finite_input_is_validation_error() {
        let resolver = resolver(MockRouter::new());
        let err = resolver
            .route(Coordinates::new(f64::NAN, 34.78), destination(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_provider_result_is_rounded_and_tagged() {
        let mut provider = MockRouter::new();
        provider.expect_drive().times(1).returning(|_, _| {
            Ok(RouteLeg {
                duration_seconds: 542.3,
                distance_meters: 6231.7,
            })
        });

        let estimate = resolver(provider)
            .route(origin(), destination(), departure())
            .await
            .unwrap();
        assert_eq!(estimate.duration_seconds, 542);
        assert_eq!(estimate.distance_meters, 6232);
        assert_eq!(estimate.source, RouteSource::Osrm);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_fallback() {
        let mut provider = MockRouter::new();
        provider
            .expect_drive()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("osrm", "HTTP 500")));

        let estimate = resolver(provider)
            .route(origin(), destination(), departure())
            .await
            .unwrap();

        assert_eq!(estimate.source, RouteSource::Fallback);
        assert!(estimate.duration_seconds >= 60);

        let expected = haversine_meters(origin(), destination());
        let delta = (estimate.distance_meters as f64 - expected).abs();
        assert!(delta / expected < 0.01, "distance off by {delta}m");
    }

    #[tokio::test]
    async fn test_non_positive_provider_values_degrade_to_fallback() {
        let mut provider = MockRouter::new();
        provider.expect_drive().times(1).returning(|_, _| {
            Ok(RouteLeg {
                duration_seconds: 0.0,
                distance_meters: 6231.7,
            })
        });

        let estimate = resolver(provider)
            .route(origin(), destination(), departure())
            .await
            .unwrap();
        assert_eq!(estimate.source, RouteSource::Fallback);
    }

    #[tokio::test]
    async fn test_same_bucket_is_served_from_cache() {
        let mut provider = MockRouter::new();
        provider.expect_drive().times(1).returning(|_, _| {
            Ok(RouteLeg {
                duration_seconds: 542.0,
                distance_meters: 6232.0,
            })
        });
        let resolver = resolver(provider);

        let depart_a = Utc.with_ymd_and_hms(2024, 5, 17, 9, 31, 0).unwrap();
        let depart_b = Utc.with_ymd_and_hms(2024, 5, 17, 9, 59, 59).unwrap();

        let first = resolver
            .route(origin(), destination(), Some(depart_a))
            .await
            .unwrap();

        // Sub-micro-degree jitter and a later time in the same half-hour
        // window must not trigger a second provider call.
        let second = resolver
            .route(
                Coordinates::new(32.0000002, 34.7800001),
                destination(),
                Some(depart_b),
            )
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fallback_is_cached_for_the_bucket() {
        let mut provider = MockRouter::new();
        provider
            .expect_drive()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("osrm", "HTTP 500")));
        let resolver = resolver(provider);

        let first = resolver
            .route(origin(), destination(), departure())
            .await
            .unwrap();
        assert_eq!(first.source, RouteSource::Fallback);

        // The failing provider is not retried within the bucket.
        let second = resolver
            .route(origin(), destination(), departure())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_new_bucket_calls_provider_again() {
        let mut provider = MockRouter::new();
        provider.expect_drive().times(2).returning(|_, _| {
            Ok(RouteLeg {
                duration_seconds: 542.0,
                distance_meters: 6232.0,
            })
        });
        let resolver = resolver(provider);

        let depart_a = Utc.with_ymd_and_hms(2024, 5, 17, 9, 15, 0).unwrap();
        let depart_b = Utc.with_ymd_and_hms(2024, 5, 17, 9, 45, 0).unwrap();

        resolver
            .route(origin(), destination(), Some(depart_a))
            .await
            .unwrap();
        resolver
            .route(origin(), destination(), Some(depart_b))
            .await
            .unwrap();
    }
}
