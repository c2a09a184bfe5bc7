//! POST /geocode

use axum::{extract::State, http::HeaderMap, Json};

use super::state::AppState;
use super::types::{ApiError, GeocodeRequest, GeocodeResponse};

/// Resolves a free-text address to coordinates. Rate limited per client
/// IP on cache misses; cache hits are always served.
pub async fn geocode(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let ip = client_ip(&headers);
    let result = state.geocode.geocode(&request.address_text, &ip).await?;
    Ok(Json(result.into()))
}

/// First entry of `x-forwarded-for`, else "unknown". The service runs
/// behind a proxy, so the socket address is not the caller.
pub(super) fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_defaults_to_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_ip(&headers), "unknown");
    }
}
