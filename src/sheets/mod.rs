//! Spreadsheet service capability.
//!
//! The handler only ever needs three things from the remote store: its
//! metadata, every row of a worksheet, and a way to append one row. They
//! sit behind [`SpreadsheetService`] so the Google client can be swapped for
//! an in-memory sheet in tests. [`SheetsConnector`] is the authentication
//! step that yields a ready-to-use service for a single request.

pub mod google;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::auth::AuthError;

pub use google::GoogleSheetsConnector;

/// Errors from the spreadsheet service
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Spreadsheet has no worksheets")]
    NoWorksheets,

    #[error("Worksheet '{0}' has no header row")]
    MissingHeaderRow(String),

    #[error("Google Sheets API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid Sheets API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    pub sheet_id: i64,
    pub title: String,
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub worksheets: Vec<WorksheetInfo>,
}

impl SpreadsheetInfo {
    /// Worksheet with the lowest index (the leftmost tab).
    pub fn first_worksheet(&self) -> Result<&WorksheetInfo, SheetsError> {
        self.worksheets
            .iter()
            .min_by_key(|sheet| sheet.index)
            .ok_or(SheetsError::NoWorksheets)
    }
}

/// Header row plus every data row below it, as displayed cell text.
/// Data rows may be shorter than the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Cell values for one appended row, keyed by header name.
pub type RowValues = HashMap<String, String>;

#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    async fn load_metadata(&self) -> Result<SpreadsheetInfo, SheetsError>;

    async fn list_rows(&self, worksheet: &WorksheetInfo) -> Result<SheetRows, SheetsError>;

    async fn append_row(&self, worksheet: &WorksheetInfo, values: &RowValues) -> Result<(), SheetsError>;
}

#[async_trait]
pub trait SheetsConnector: Send + Sync {
    /// Authenticate and return a service bound to the configured spreadsheet.
    async fn connect(&self) -> Result<Box<dyn SpreadsheetService>, SheetsError>;
}

/// Lay out `values` in header order. Headers with no value get an empty cell.
/// Returns the row and the keys that matched no header.
pub fn row_in_header_order(headers: &[String], values: &RowValues) -> (Vec<String>, Vec<String>) {
    let row = headers
        .iter()
        .map(|header| values.get(header).cloned().unwrap_or_default())
        .collect();

    let mut unmatched: Vec<String> = values
        .keys()
        .filter(|key| !headers.iter().any(|header| header == *key))
        .cloned()
        .collect();
    unmatched.sort();

    (row, unmatched)
}
