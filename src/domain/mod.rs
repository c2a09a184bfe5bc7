//! Domain layer - coordinate policy, address candidates, cache entries,
//! and the provider seams.

pub mod address;
pub mod cache;
pub mod coords;
pub mod error;
pub mod geocode;
pub mod route;

pub use cache::{GeoCacheEntry, GeoCacheRepository, RouteCacheRepository};
pub use error::DomainError;
pub use geocode::{GeocodeHit, GeocodeProvider, GeocodeResult, GeocodeSource};
pub use route::{
    Coordinates, RouteCacheKey, RouteEstimate, RouteLeg, RouteSource, RoutingProvider,
};
