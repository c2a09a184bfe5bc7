//! Route endpoint DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, RouteEstimate, RouteSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub origin: Option<CoordinatesDto>,
    #[serde(default)]
    pub destination: Option<CoordinatesDto>,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
}

/// Coordinates as they appear on the wire. Every field is optional so that
/// missing values surface as a 400 from the handler instead of a
/// deserialization rejection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoordinatesDto {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl CoordinatesDto {
    /// `None` when either component is absent; non-finite values pass
    /// through and are rejected by the resolver's validation.
    pub fn into_coordinates(self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lng?))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub duration_seconds: i64,
    pub distance_meters: i64,
    pub provider: RouteSource,
}

impl From<RouteEstimate> for RouteResponse {
    fn from(estimate: RouteEstimate) -> Self {
        Self {
            duration_seconds: estimate.duration_seconds,
            distance_meters: estimate.distance_meters,
            provider: estimate.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_departure_time() {
        let request: RouteRequest = serde_json::from_str(
            r#"{
                "origin": {"lat": 32.0, "lng": 34.78},
                "destination": {"lat": 32.05, "lng": 34.76},
                "departureTime": "2024-05-17T09:40:00Z"
            }"#,
        )
        .unwrap();
        let origin = request.origin.unwrap();
        assert_eq!(origin.lat, Some(32.0));
        assert!(request.departure_time.is_some());
    }

    #[test]
    fn test_departure_time_is_optional() {
        let request: RouteRequest = serde_json::from_str(
            r#"{"origin": {"lat": 32.0, "lng": 34.78}, "destination": {"lat": 32.05, "lng": 34.76}}"#,
        )
        .unwrap();
        assert!(request.departure_time.is_none());
    }

    #[test]
    fn test_missing_fields_still_deserialize() {
        // The extractor must accept these bodies so the handler can answer
        // with a 400 instead of a generic rejection.
        let request: RouteRequest =
            serde_json::from_str(r#"{"destination": {"lat": 32.05, "lng": 34.76}}"#).unwrap();
        assert!(request.origin.is_none());

        let request: RouteRequest = serde_json::from_str(
            r#"{"origin": {"lat": 32.0}, "destination": {"lat": 32.05, "lng": 34.76}}"#,
        )
        .unwrap();
        assert!(request.origin.unwrap().into_coordinates().is_none());
    }

    #[test]
    fn test_complete_coordinates_convert() {
        let dto = CoordinatesDto {
            lat: Some(32.0),
            lng: Some(34.78),
        };
        let coords = dto.into_coordinates().unwrap();
        assert_eq!(coords.lat, 32.0);
        assert_eq!(coords.lng, 34.78);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = RouteResponse::from(RouteEstimate {
            duration_seconds: 542,
            distance_meters: 6232,
            source: RouteSource::Fallback,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["durationSeconds"], 542);
        assert_eq!(json["distanceMeters"], 6232);
        assert_eq!(json["provider"], "fallback");
    }
}
