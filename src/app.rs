use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::{AppConfig, HEALTH_PATH};
use crate::handlers;
use crate::sheets::SheetsConnector;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sheets: Arc<dyn SheetsConnector>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, sheets: Arc<dyn SheetsConnector>) -> Self {
        Self { config, sheets }
    }
}

pub fn app(state: AppState) -> Router {
    let sync_path = state.config.server.sync_path.clone();
    let body_limit = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .route(HEALTH_PATH, get(handlers::health))
        // Sync endpoint, every method lands in one handler
        .route(&sync_path, any(handlers::sheet_sync))
        .fallback(handlers::not_found)
        .with_state(state)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                .layer(cors_header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
                .layer(cors_header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Fixed CORS header on every response, errors and 404s included.
fn cors_header(name: header::HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
