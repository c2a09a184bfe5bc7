use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub geocoding: GeocodingConfig,
    pub routing: RoutingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Server-held key for the primary commercial geocoder. When absent
    /// the primary provider is skipped entirely and only the open
    /// secondary provider is queried.
    pub google_api_key: Option<String>,
    pub google_base_url: String,
    pub nominatim_base_url: String,
    /// Sent to Nominatim on every request, per its usage policy.
    pub user_agent: String,
    pub timeout_secs: u64,
    pub rate_limit: u32,
    pub rate_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub osrm_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Optional: without it the service runs with memory-only caching and
    /// the backfill command refuses to start.
    pub url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_base_url: "https://maps.googleapis.com".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "geo-gateway/0.1 (support@geo-gateway.example)".to_string(),
            timeout_secs: 10,
            rate_limit: 40,
            rate_window_secs: 60,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            osrm_base_url: "https://router.project-osrm.org".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Conventional env vars win over nothing, not over explicit config.
        if app_config.geocoding.google_api_key.is_none() {
            app_config.geocoding.google_api_key = std::env::var("GOOGLE_MAPS_API_KEY").ok();
        }
        if app_config.database.url.is_none() {
            app_config.database.url = std::env::var("DATABASE_URL").ok();
        }

        Ok(app_config)
    }
}
