// handlers/sheet_sync.rs - OPTIONS/GET/POST on the sync endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::sheet_sync as sync_service;
use crate::types::SyncRequest;

/**
 * Single sync endpoint, dispatched on method.
 *
 * - OPTIONS: preflight, 200 with an empty body, never touches the sheet
 * - GET: every data row of the first worksheet as `[{header: value}, ...]`
 * - POST: `{ "userId"?: string, "data": any }` appended as a Sync Row,
 *   answered with `{ "success": true, "message": "Data saved successfully" }`
 * - anything else: 405
 *
 * CORS headers are added by the router for every outcome.
 */
pub async fn sheet_sync(State(state): State<AppState>, method: Method, body: Bytes) -> Result<Response, ApiError> {
    match method {
        Method::OPTIONS => Ok(StatusCode::OK.into_response()),
        Method::GET => {
            let rows = sync_service::read_rows(state.sheets.as_ref()).await?;
            Ok(Json(rows).into_response())
        }
        Method::POST => {
            let request = parse_sync_request(&body)?;
            sync_service::append_sync_row(state.sheets.as_ref(), request, chrono::Utc::now()).await?;
            Ok(Json(json!({ "success": true, "message": "Data saved successfully" })).into_response())
        }
        other => {
            info!("Rejected {} on sync endpoint", other);
            Err(ApiError::MethodNotAllowed)
        }
    }
}

/// The body must be a JSON object; its fields are all optional.
fn parse_sync_request(body: &[u8]) -> Result<SyncRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::invalid_json("request body must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ApiError::invalid_json(e.to_string()))
}
