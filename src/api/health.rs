//! Health check endpoints

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn ready_check() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

pub async fn live_check() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}
