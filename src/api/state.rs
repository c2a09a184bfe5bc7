//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::resolver::{GeocodeResolver, RouteResolver};

/// Shared resolvers, constructed once at startup and injected into
/// handlers.
#[derive(Clone)]
pub struct AppState {
    pub geocode: Arc<GeocodeResolver>,
    pub route: Arc<RouteResolver>,
}

impl AppState {
    pub fn new(geocode: Arc<GeocodeResolver>, route: Arc<RouteResolver>) -> Self {
        Self { geocode, route }
    }
}
