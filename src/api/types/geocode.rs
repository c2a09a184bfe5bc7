//! Geocode endpoint DTOs

use serde::{Deserialize, Serialize};

use crate::domain::{GeocodeResult, GeocodeSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeRequest {
    #[serde(default)]
    pub address_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lng: f64,
    pub normalized_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<String>,
    pub provider: GeocodeSource,
}

impl From<GeocodeResult> for GeocodeResponse {
    fn from(result: GeocodeResult) -> Self {
        Self {
            lat: result.lat,
            lng: result.lng,
            normalized_address: result.normalized_address,
            resolved_address: result.resolved_address,
            provider: result.source,
        }
    }
}
