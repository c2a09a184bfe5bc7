//! Nominatim provider (secondary, open, no API key)
//!
//! Searches are restricted to Israel via `countrycodes`. Nominatim's usage
//! policy requires a descriptive User-Agent, so one is sent on every
//! request. Numeric fields arrive as strings and go through the coordinate
//! parser.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::coords::parse_coord;
use crate::domain::{DomainError, GeocodeHit, GeocodeProvider, GeocodeSource};

const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self::with_base_url(client, user_agent, DEFAULT_NOMINATIM_BASE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        user_agent: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::Nominatim
    }

    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>, DomainError> {
        let response = self
            .client
            .get(self.search_url())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("countrycodes", "il"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::provider("nominatim", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::provider(
                "nominatim",
                format!("unexpected HTTP status {status}"),
            ));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| DomainError::provider("nominatim", format!("malformed body: {e}")))?;

        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        // An unparseable hit counts as no match for this candidate, not a
        // service failure; the resolver moves on to the next query.
        let (Some(lat), Some(lng)) = (parse_coord(&first.lat), parse_coord(&first.lon)) else {
            warn!(
                lat = first.lat.as_str(),
                lon = first.lon.as_str(),
                "nominatim returned non-numeric coordinates, skipping hit"
            );
            return Ok(None);
        };

        Ok(Some(GeocodeHit {
            lat,
            lng,
            resolved_address: first.display_name,
        }))
    }
}
