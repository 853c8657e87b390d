use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Success message, with extra fields merged in for JSON output
pub fn format_success(output_format: OutputFormat, message: &str, data: Map<String, Value>) -> anyhow::Result<String> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(object) = response.as_object_mut() {
                object.extend(data);
            }
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Text => Ok(format!("✓ {}", message)),
    }
}

/// Rows as a JSON array, or one `key=value` line per row
pub fn format_rows(output_format: OutputFormat, rows: &[Map<String, Value>]) -> anyhow::Result<String> {
    match output_format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Text if rows.is_empty() => Ok("No rows".to_string()),
        OutputFormat::Text => Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(key, value)| format!("{}={}", key, value.as_str().unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
