//! Resolution orchestrators for geocoding and routing

mod geocode;
mod route;

pub use geocode::{resolve_candidates, GeocodeResolver};
pub use route::RouteResolver;
