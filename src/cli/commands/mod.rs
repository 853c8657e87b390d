use anyhow::Context;
use serde_json::{json, Map, Value};

use crate::cli::utils::{format_rows, format_success};
use crate::cli::{Commands, OutputFormat};
use crate::services::sheet_sync;
use crate::sheets::SheetsConnector;
use crate::types::SyncRequest;

/// Run one command and return what should be printed.
pub async fn execute(
    command: Commands,
    output_format: OutputFormat,
    sheets: &dyn SheetsConnector,
) -> anyhow::Result<String> {
    match command {
        Commands::Info => info(output_format, sheets).await,
        Commands::Rows => {
            let rows = sheet_sync::read_rows(sheets).await?;
            format_rows(output_format, &rows)
        }
        Commands::Append { user_id, data } => append(output_format, sheets, user_id, &data).await,
    }
}

/// Connectivity check: authenticate, then describe the spreadsheet.
async fn info(output_format: OutputFormat, sheets: &dyn SheetsConnector) -> anyhow::Result<String> {
    let sheet = sheets.connect().await.context("authentication failed")?;
    let info = sheet.load_metadata().await?;
    let worksheet = info.first_worksheet()?;
    let rows = sheet.list_rows(worksheet).await?;

    match output_format {
        OutputFormat::Json => {
            let mut data = Map::new();
            data.insert("title".to_string(), json!(info.title));
            data.insert(
                "worksheets".to_string(),
                json!(info.worksheets.iter().map(|w| &w.title).collect::<Vec<_>>()),
            );
            data.insert("headers".to_string(), json!(rows.headers));
            data.insert("rows".to_string(), json!(rows.rows.len()));
            format_success(output_format, "Connected to Google Sheets successfully", data)
        }
        OutputFormat::Text => {
            let titles: Vec<&str> = info.worksheets.iter().map(|w| w.title.as_str()).collect();
            Ok(format!(
                "✓ Connected to '{}'\nWorksheets: {}\nHeaders ({}): {}\nData rows: {}",
                info.title,
                titles.join(", "),
                worksheet.title,
                rows.headers.join(", "),
                rows.rows.len()
            ))
        }
    }
}

async fn append(
    output_format: OutputFormat,
    sheets: &dyn SheetsConnector,
    user_id: Option<String>,
    data: &str,
) -> anyhow::Result<String> {
    let data: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    let request = SyncRequest {
        user_id: user_id.map(Value::String),
        data: Some(data),
    };

    let row = sheet_sync::append_sync_row(sheets, request, chrono::Utc::now()).await?;

    let mut fields = Map::new();
    fields.insert("row".to_string(), serde_json::to_value(&row)?);
    format_success(output_format, "Data saved successfully", fields)
}
