// handlers/health.rs - GET /health handler (liveness only, no sheet access) and 404 fallback

use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
