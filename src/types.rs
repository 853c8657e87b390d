//! Shared types used across the codebase

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sheets::RowValues;

pub const ANONYMOUS_USER: &str = "anonymous";

/// Body of a sync write. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// One appended spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRow {
    pub timestamp: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub data: String,
}

impl SyncRow {
    /// The payload is stored as JSON text; a missing payload becomes `null`.
    pub fn from_request(request: SyncRequest, now: DateTime<Utc>) -> Self {
        let data = request.data.unwrap_or(Value::Null);

        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_id: user_id_or_anonymous(request.user_id),
            data: data.to_string(),
        }
    }

    pub fn to_row_values(&self) -> RowValues {
        let mut values = RowValues::new();
        values.insert("timestamp".to_string(), self.timestamp.clone());
        values.insert("userId".to_string(), self.user_id.clone());
        values.insert("data".to_string(), self.data.clone());
        values
    }
}

/// Falsy ids (`null`, `""`, `false`, `0`) fall back to the anonymous user.
fn user_id_or_anonymous(user_id: Option<Value>) -> String {
    match user_id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(value @ (Value::Array(_) | Value::Object(_))) => value.to_string(),
        _ => ANONYMOUS_USER.to_string(),
    }
}
