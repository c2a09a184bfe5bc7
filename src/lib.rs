//! Geo Gateway
//!
//! Geocoding and route caching API for a field-service CRM operating in
//! Israel:
//! - Free-text address resolution with two-provider fallback
//! - Driving-route estimates with a haversine fallback
//! - Two-tier caching (in-process + Postgres) with no-TTL entries
//! - Per-IP fixed-window rate limiting on outbound geocode calls
//! - Batch backfill for job rows with unusable coordinates

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use api::AppState;
use domain::GeocodeProvider;
use infrastructure::cache::{PersistentCache, PostgresCacheRepository, TieredCacheStore};
use infrastructure::providers::{GoogleGeocoder, NominatimGeocoder, OsrmRouter};
use infrastructure::rate_limit::FixedWindowRateLimiter;
use infrastructure::resolver::{GeocodeResolver, RouteResolver};

/// Shared HTTP client for provider calls, with a request timeout so a
/// stalled provider degrades like a failed one.
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to build HTTP client")
}

/// Geocode providers in priority order. The commercial provider is
/// included only when a server-held key is configured.
pub fn build_geocode_providers(
    config: &AppConfig,
    client: &reqwest::Client,
) -> Vec<Arc<dyn GeocodeProvider>> {
    let mut providers: Vec<Arc<dyn GeocodeProvider>> = Vec::new();

    match &config.geocoding.google_api_key {
        Some(key) if !key.is_empty() => {
            providers.push(Arc::new(GoogleGeocoder::with_base_url(
                client.clone(),
                key.clone(),
                config.geocoding.google_base_url.clone(),
            )));
        }
        _ => {
            info!("no Google API key configured, primary geocoder disabled");
        }
    }

    providers.push(Arc::new(NominatimGeocoder::with_base_url(
        client.clone(),
        config.geocoding.user_agent.clone(),
        config.geocoding.nominatim_base_url.clone(),
    )));

    providers
}

/// Connects the persistent cache tier, or returns `None` when no database
/// is configured or reachable. The service always starts; without
/// Postgres it serves from the memory tier alone.
pub async fn connect_persistent_cache(config: &AppConfig) -> Option<Arc<dyn PersistentCache>> {
    let url = config.database.url.as_deref()?;
    match PostgresCacheRepository::connect(url).await {
        Ok(repository) => {
            info!("persistent cache tier connected");
            Some(Arc::new(repository))
        }
        Err(e) => {
            warn!("persistent cache tier unavailable, running memory-only: {e}");
            None
        }
    }
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let geocode_client = http_client(config.geocoding.timeout_secs);
    let routing_client = http_client(config.routing.timeout_secs);

    let persistent = connect_persistent_cache(config).await;
    let cache = Arc::new(TieredCacheStore::new(persistent));
    let limiter = Arc::new(FixedWindowRateLimiter::new());

    let geocode = Arc::new(GeocodeResolver::new(
        cache.clone(),
        limiter,
        build_geocode_providers(config, &geocode_client),
        config.geocoding.rate_limit,
        Duration::from_secs(config.geocoding.rate_window_secs),
    ));

    let route = Arc::new(RouteResolver::new(
        cache,
        Arc::new(OsrmRouter::with_base_url(
            routing_client,
            config.routing.osrm_base_url.clone(),
        )),
    ));

    Ok(AppState::new(geocode, route))
}
