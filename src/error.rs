// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::sheets::SheetsError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// `summary` is the short `error` text; `details` carries the underlying
/// message. Neither ever includes a backtrace.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    InvalidJson(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 500 Internal Server Error (bad or rejected credentials)
    Configuration(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (sheet reachable but unusable)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "Invalid request body",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Configuration(_) => "Google Sheets credentials are misconfigured",
            ApiError::InternalServerError(_) => "Internal server error",
            ApiError::BadGateway(_) => "Failed to access Google Sheet",
            ApiError::ServiceUnavailable(_) => "Google Sheets is unavailable",
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::MethodNotAllowed => None,
            ApiError::InvalidJson(msg)
            | ApiError::Configuration(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => Some(msg),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Configuration(_) => "CONFIGURATION_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.summary(),
            "code": self.error_code()
        });
        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }
        body
    }
}

impl ApiError {
    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Transport(e) => transport_error(&e),
            AuthError::Rejected { status, .. } if status >= 500 => {
                tracing::error!("Token endpoint unavailable: {}", err);
                ApiError::ServiceUnavailable(err.to_string())
            }
            other => {
                tracing::error!("Service account authentication failed: {}", other);
                ApiError::Configuration(other.to_string())
            }
        }
    }
}

impl From<SheetsError> for ApiError {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Auth(e) => e.into(),
            SheetsError::Transport(e) => transport_error(&e),
            SheetsError::Upstream { status, .. } if status >= 500 => {
                tracing::error!("Sheets API unavailable: {}", err);
                ApiError::ServiceUnavailable(err.to_string())
            }
            SheetsError::Upstream { .. } | SheetsError::NoWorksheets | SheetsError::MissingHeaderRow(_) => {
                tracing::error!("Sheets API error: {}", err);
                ApiError::BadGateway(err.to_string())
            }
            SheetsError::InvalidUrl(_) => {
                tracing::error!("Sheets client misconfigured: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
        }
    }
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    tracing::error!("Request to Google failed: {}", err);
    if err.is_decode() {
        ApiError::BadGateway(format!("Unexpected response from Google: {}", err))
    } else {
        ApiError::ServiceUnavailable(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.details() {
            Some(details) => write!(f, "{}: {}", self.summary(), details),
            None => f.write_str(self.summary()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
