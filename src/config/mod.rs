//! Configuration layer

mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, GeocodingConfig, LogFormat, LoggingConfig, RoutingConfig,
    ServerConfig,
};
