//! Geocoding domain types and the provider seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Where a geocode result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocodeSource {
    Google,
    Nominatim,
    Cache,
}

impl GeocodeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Nominatim => "nominatim",
            Self::Cache => "cache",
        }
    }
}

impl std::fmt::Display for GeocodeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeocodeSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "nominatim" => Ok(Self::Nominatim),
            "cache" => Ok(Self::Cache),
            other => Err(DomainError::internal(format!(
                "unknown geocode source: {other}"
            ))),
        }
    }
}

/// A single raw hit from a provider, before validity gating.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lng: f64,
    pub resolved_address: Option<String>,
}

/// A fully resolved geocode, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub normalized_address: String,
    pub resolved_address: Option<String>,
    pub source: GeocodeSource,
}

/// A geocoding provider, queried with one candidate string at a time.
///
/// `Ok(None)` is a clean miss (the provider answered but had no match);
/// `Err` is a transport or protocol failure. The resolver relies on the
/// distinction to separate "address doesn't exist" from "service is down".
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    fn source(&self) -> GeocodeSource;

    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>, DomainError>;
}
