use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::info;

use crate::sheets::{SheetRows, SheetsConnector, SheetsError};
use crate::types::{SyncRequest, SyncRow};

/// Read every data row of the first worksheet as header-keyed objects.
pub async fn read_rows(connector: &dyn SheetsConnector) -> Result<Vec<Map<String, Value>>, SheetsError> {
    let sheet = connector.connect().await?;
    let info = sheet.load_metadata().await?;
    let worksheet = info.first_worksheet()?;

    let rows = sheet.list_rows(worksheet).await?;
    info!(
        "Read {} rows from '{}' / '{}'",
        rows.rows.len(),
        info.title,
        worksheet.title
    );

    Ok(rows_to_objects(&rows))
}

/// Append one Sync Row to the first worksheet.
pub async fn append_sync_row(
    connector: &dyn SheetsConnector,
    request: SyncRequest,
    now: DateTime<Utc>,
) -> Result<SyncRow, SheetsError> {
    let row = SyncRow::from_request(request, now);

    let sheet = connector.connect().await?;
    let info = sheet.load_metadata().await?;
    let worksheet = info.first_worksheet()?;

    sheet.append_row(worksheet, &row.to_row_values()).await?;
    info!("Appended sync row for user '{}' to '{}'", row.user_id, worksheet.title);

    Ok(row)
}

/// One object per data row. Every non-blank header becomes a key; cells
/// missing from short rows read as `""`. A repeated header keeps the
/// rightmost cell.
pub fn rows_to_objects(rows: &SheetRows) -> Vec<Map<String, Value>> {
    rows.rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (i, header) in rows.headers.iter().enumerate() {
                if header.trim().is_empty() {
                    continue;
                }
                let cell = row.get(i).cloned().unwrap_or_default();
                object.insert(header.clone(), Value::String(cell));
            }
            object
        })
        .collect()
}
