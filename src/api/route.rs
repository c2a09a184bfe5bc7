//! POST /route

use axum::{extract::State, Json};

use crate::domain::Coordinates;

use super::state::AppState;
use super::types::{ApiError, CoordinatesDto, RouteRequest, RouteResponse};

/// Estimates a driving route. Degrades to the haversine fallback rather
/// than failing, so the only error this endpoint returns is a 400 for
/// missing or non-finite coordinates.
pub async fn route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let origin = required_coordinates(request.origin, "origin")?;
    let destination = required_coordinates(request.destination, "destination")?;

    let estimate = state
        .route
        .route(origin, destination, request.departure_time)
        .await?;
    Ok(Json(estimate.into()))
}

fn required_coordinates(
    dto: Option<CoordinatesDto>,
    field: &str,
) -> Result<Coordinates, ApiError> {
    dto.and_then(CoordinatesDto::into_coordinates)
        .ok_or_else(|| ApiError::bad_request(format!("{field} must have numeric lat and lng")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::{create_router, AppState};
    use crate::domain::{DomainError, RouteLeg, RoutingProvider};
    use crate::infrastructure::cache::TieredCacheStore;
    use crate::infrastructure::rate_limit::FixedWindowRateLimiter;
    use crate::infrastructure::resolver::{GeocodeResolver, RouteResolver};

    struct StubRouter;

    #[async_trait]
    impl RoutingProvider for StubRouter {
        async fn drive(
            &self,
            _origin: crate::domain::Coordinates,
            _destination: crate::domain::Coordinates,
        ) -> Result<RouteLeg, DomainError> {
            Ok(RouteLeg {
                duration_seconds: 542.0,
                distance_meters: 6232.0,
            })
        }
    }

    fn app() -> axum::Router {
        let cache = Arc::new(TieredCacheStore::memory_only());
        let geocode = Arc::new(GeocodeResolver::new(
            cache.clone(),
            Arc::new(FixedWindowRateLimiter::new()),
            Vec::new(),
            40,
            Duration::from_secs(60),
        ));
        let route = Arc::new(RouteResolver::new(cache, Arc::new(StubRouter)));
        create_router(AppState::new(geocode, route))
    }

    async fn post_route(body: &str) -> StatusCode {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/route")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_origin_is_bad_request() {
        let status = post_route(r#"{"destination": {"lat": 32.05, "lng": 34.76}}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partial_coordinates_are_bad_request() {
        let status = post_route(
            r#"{"origin": {"lat": 32.0}, "destination": {"lat": 32.05, "lng": 34.76}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_complete_request_succeeds() {
        let status = post_route(
            r#"{"origin": {"lat": 32.0, "lng": 34.78}, "destination": {"lat": 32.05, "lng": 34.76}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
