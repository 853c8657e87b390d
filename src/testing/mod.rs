use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::AuthError;
use crate::sheets::{
    row_in_header_order, RowValues, SheetRows, SheetsConnector, SheetsError, SpreadsheetInfo,
    SpreadsheetService, WorksheetInfo,
};

/// In-memory spreadsheet standing in for Google Sheets in tests.
///
/// Cloning shares the same sheet, so a test can hand one clone to the app
/// and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MemorySheets {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    worksheets: Vec<MemoryWorksheet>,
    connects: usize,
    fail_connect: bool,
    upstream_status: Option<u16>,
}

struct MemoryWorksheet {
    info: WorksheetInfo,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl MemorySheets {
    /// Spreadsheet with a single worksheet `Sheet1` (sheet id 0).
    pub fn with_headers(headers: &[&str]) -> Self {
        let sheets = Self::default();
        sheets.lock().worksheets.push(MemoryWorksheet {
            info: WorksheetInfo { sheet_id: 0, title: "Sheet1".to_string(), index: 0 },
            headers: strings(headers),
            rows: Vec::new(),
        });
        sheets
    }

    /// Spreadsheet with no worksheets at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a new leftmost worksheet, shifting the others right.
    pub fn add_worksheet_before(&self, title: &str, headers: &[&str]) {
        let mut state = self.lock();
        let sheet_id = state.worksheets.iter().map(|w| w.info.sheet_id).max().unwrap_or(0) + 1;
        for worksheet in state.worksheets.iter_mut() {
            worksheet.info.index += 1;
        }
        state.worksheets.push(MemoryWorksheet {
            info: WorksheetInfo { sheet_id, title: title.to_string(), index: 0 },
            headers: strings(headers),
            rows: Vec::new(),
        });
    }

    /// Add a data row to `Sheet1`.
    pub fn push_row(&self, cells: &[&str]) {
        if let Some(worksheet) = self.lock().worksheets.iter_mut().find(|w| w.info.sheet_id == 0) {
            worksheet.rows.push(strings(cells));
        }
    }

    /// Data rows of `Sheet1`.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock()
            .worksheets
            .iter()
            .find(|w| w.info.sheet_id == 0)
            .map(|w| w.rows.clone())
            .unwrap_or_default()
    }

    /// How many times a caller authenticated.
    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    /// Make authentication fail as if the token exchange was rejected.
    pub fn fail_connect(&self) {
        self.lock().fail_connect = true;
    }

    /// Make every sheet call fail with the given API status.
    pub fn fail_upstream(&self, status: u16) {
        self.lock().upstream_status = Some(status);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SheetsConnector for MemorySheets {
    async fn connect(&self) -> Result<Box<dyn SpreadsheetService>, SheetsError> {
        let mut state = self.lock();
        state.connects += 1;
        if state.fail_connect {
            return Err(AuthError::Rejected {
                status: 400,
                message: "invalid_grant: Invalid JWT Signature.".to_string(),
            }
            .into());
        }
        Ok(Box::new(MemorySpreadsheet { sheets: self.clone() }))
    }
}

struct MemorySpreadsheet {
    sheets: MemorySheets,
}

impl MemorySpreadsheet {
    fn check_upstream(state: &MemoryState) -> Result<(), SheetsError> {
        match state.upstream_status {
            Some(status) => Err(SheetsError::Upstream {
                status,
                message: "simulated failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SpreadsheetService for MemorySpreadsheet {
    async fn load_metadata(&self) -> Result<SpreadsheetInfo, SheetsError> {
        let state = self.sheets.lock();
        Self::check_upstream(&state)?;
        Ok(SpreadsheetInfo {
            title: "Memory".to_string(),
            worksheets: state.worksheets.iter().map(|w| w.info.clone()).collect(),
        })
    }

    async fn list_rows(&self, worksheet: &WorksheetInfo) -> Result<SheetRows, SheetsError> {
        let state = self.sheets.lock();
        Self::check_upstream(&state)?;
        let found = state
            .worksheets
            .iter()
            .find(|w| w.info.sheet_id == worksheet.sheet_id)
            .ok_or_else(|| SheetsError::Upstream {
                status: 400,
                message: format!("Unable to parse range: '{}'", worksheet.title),
            })?;
        Ok(SheetRows {
            headers: found.headers.clone(),
            rows: found.rows.clone(),
        })
    }

    async fn append_row(&self, worksheet: &WorksheetInfo, values: &RowValues) -> Result<(), SheetsError> {
        let mut state = self.sheets.lock();
        Self::check_upstream(&state)?;
        let found = state
            .worksheets
            .iter_mut()
            .find(|w| w.info.sheet_id == worksheet.sheet_id)
            .ok_or_else(|| SheetsError::Upstream {
                status: 400,
                message: format!("Unable to parse range: '{}'", worksheet.title),
            })?;
        if found.headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SheetsError::MissingHeaderRow(worksheet.title.clone()));
        }
        let (row, _) = row_in_header_order(&found.headers, values);
        found.rows.push(row);
        Ok(())
    }
}
