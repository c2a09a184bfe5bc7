//! Routing domain types: cache keys, time bucketing, and the haversine
//! fallback estimate used when the live routing provider is unavailable.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::DomainError;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Assumed average driving speed for fallback estimates: 45 km/h.
const FALLBACK_SPEED_MPS: f64 = 12.5;

/// Fallback durations are never reported below one minute.
const MIN_FALLBACK_DURATION_SECONDS: i64 = 60;

/// A latitude/longitude pair as supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Where a route estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Osrm,
    Fallback,
}

impl RouteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Osrm => "osrm",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for RouteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osrm" => Ok(Self::Osrm),
            "fallback" => Ok(Self::Fallback),
            other => Err(DomainError::internal(format!(
                "unknown route source: {other}"
            ))),
        }
    }
}

/// A resolved route estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEstimate {
    pub duration_seconds: i64,
    pub distance_meters: i64,
    pub source: RouteSource,
}

/// Raw duration/distance from a routing provider, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub duration_seconds: f64,
    pub distance_meters: f64,
}

/// Cache key for route lookups.
///
/// Coordinates are quantized to 6 decimal places (stored as micro-degree
/// integers so the key is `Eq + Hash` and maps onto exact natural-key
/// columns) and the departure time is floored to a 30-minute bucket, so
/// near-duplicate requests collapse to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteCacheKey {
    pub origin_lat6: i64,
    pub origin_lng6: i64,
    pub dest_lat6: i64,
    pub dest_lng6: i64,
    pub departure_bucket: String,
}

impl RouteCacheKey {
    pub fn new(origin: Coordinates, destination: Coordinates, departure_bucket: String) -> Self {
        Self {
            origin_lat6: to_micro_degrees(origin.lat),
            origin_lng6: to_micro_degrees(origin.lng),
            dest_lat6: to_micro_degrees(destination.lat),
            dest_lng6: to_micro_degrees(destination.lng),
            departure_bucket,
        }
    }

    /// The quantized origin, as sent to the routing provider.
    pub fn origin(&self) -> Coordinates {
        Coordinates::new(
            from_micro_degrees(self.origin_lat6),
            from_micro_degrees(self.origin_lng6),
        )
    }

    /// The quantized destination, as sent to the routing provider.
    pub fn destination(&self) -> Coordinates {
        Coordinates::new(
            from_micro_degrees(self.dest_lat6),
            from_micro_degrees(self.dest_lng6),
        )
    }
}

fn to_micro_degrees(value: f64) -> i64 {
    (value * 1e6).round() as i64
}

fn from_micro_degrees(value: i64) -> f64 {
    value as f64 / 1e6
}

/// Floors the given time (or "now" if absent) to the preceding 30-minute
/// boundary and returns it as an RFC 3339 string in UTC.
///
/// This is the canonical bucketing function; every caller must apply it
/// before building a [`RouteCacheKey`].
pub fn departure_bucket_iso(time: Option<DateTime<Utc>>) -> String {
    let time = time.unwrap_or_else(Utc::now);
    let floored_minute = (time.minute() / 30) * 30;
    let bucket = time
        .with_minute(floored_minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time);
    bucket.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Great-circle distance in meters between two points.
pub fn haversine_meters(origin: Coordinates, destination: Coordinates) -> f64 {
    let lat1 = origin.lat.to_radians();
    let lat2 = destination.lat.to_radians();
    let dlat = (destination.lat - origin.lat).to_radians();
    let dlng = (destination.lng - origin.lng).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Straight-line estimate used when the routing provider fails or returns
/// non-positive values. Duration assumes 45 km/h and is floored at 60
/// seconds.
pub fn fallback_estimate(origin: Coordinates, destination: Coordinates) -> RouteEstimate {
    let distance = haversine_meters(origin, destination);
    let duration = (distance / FALLBACK_SPEED_MPS).round() as i64;
    RouteEstimate {
        duration_seconds: duration.max(MIN_FALLBACK_DURATION_SECONDS),
        distance_meters: distance.round() as i64,
        source: RouteSource::Fallback,
    }
}

/// A road-network routing provider.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn drive(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteLeg, DomainError>;
}
