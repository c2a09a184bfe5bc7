//! OSRM routing provider
//!
//! Driving-route query with lng,lat pairs; the first route option's
//! duration and distance are returned. All failures surface as provider
//! errors and are converted into the haversine fallback by the resolver.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Coordinates, DomainError, RouteLeg, RoutingProvider};

const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org";

#[derive(Debug)]
pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmRouter {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_OSRM_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn route_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, origin.lng, origin.lat, destination.lng, destination.lat
        )
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    duration: f64,
    distance: f64,
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn drive(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteLeg, DomainError> {
        let response = self
            .client
            .get(self.route_url(origin, destination))
            .query(&[("overview", "false")])
            .send()
            .await
            .map_err(|e| DomainError::provider("osrm", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::provider(
                "osrm",
                format!("unexpected HTTP status {status}"),
            ));
        }

        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| DomainError::provider("osrm", format!("malformed body: {e}")))?;

        if body.code != "Ok" {
            return Err(DomainError::provider(
                "osrm",
                format!("API code {}", body.code),
            ));
        }

        let route = body.routes.into_iter().next().ok_or_else(|| {
            DomainError::provider("osrm", "no routes in success response".to_string())
        })?;

        Ok(RouteLeg {
            duration_seconds: route.duration,
            distance_meters: route.distance,
        })
    }
}
