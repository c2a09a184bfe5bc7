//! Google Geocoding API provider (primary, requires a server-held key)

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, GeocodeHit, GeocodeProvider, GeocodeSource};

const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";

/// Primary commercial geocoder. Constructed only when an API key is
/// configured; the key stays server-side and is never echoed in errors.
#[derive(Debug)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GOOGLE_BASE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn geocode_url(&self) -> String {
        format!("{}/maps/api/geocode/json", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: Option<String>,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[async_trait]
impl GeocodeProvider for GoogleGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::Google
    }

    async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>, DomainError> {
        let response = self
            .client
            .get(self.geocode_url())
            .query(&[
                ("address", query),
                ("region", "il"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::provider("google", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::provider(
                "google",
                format!("unexpected HTTP status {status}"),
            ));
        }

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| DomainError::provider("google", format!("malformed body: {e}")))?;

        match body.status.as_str() {
            "OK" => Ok(body.results.into_iter().next().map(|r| GeocodeHit {
                lat: r.geometry.location.lat,
                lng: r.geometry.location.lng,
                resolved_address: r.formatted_address,
            })),
            "ZERO_RESULTS" => Ok(None),
            other => Err(DomainError::provider(
                "google",
                format!("API status {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn geocoder(server: &MockServer) -> GoogleGeocoder {
        GoogleGeocoder::with_base_url(reqwest::Client::new(), "test-key", server.uri())
    }

    #[tokio::test]
    async fn test_first_result_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "הרצל 10, אשדוד"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [
                    {
                        "formatted_address": "Herzl St 10, Ashdod, Israel",
                        "geometry": { "location": { "lat": 31.79, "lng": 34.65 } }
                    },
                    {
                        "formatted_address": "elsewhere",
                        "geometry": { "location": { "lat": 32.0, "lng": 34.8 } }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let hit = geocoder(&server)
            .lookup("הרצל 10, אשדוד")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.lat, 31.79);
        assert_eq!(hit.lng, 34.65);
        assert_eq!(
            hit.resolved_address.as_deref(),
            Some("Herzl St 10, Ashdod, Israel")
        );
    }

    #[tokio::test]
    async fn test_zero_results_is_clean_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&server)
            .await;

        let result = geocoder(&server).lookup("nowhere").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_denied_key_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "REQUEST_DENIED",
                "results": []
            })))
            .mount(&server)
            .await;

        let err = geocoder(&server).lookup("anywhere").await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = geocoder(&server).lookup("anywhere").await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }
}
