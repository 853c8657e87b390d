// Google Sheets REST v4 client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{
    row_in_header_order, RowValues, SheetRows, SheetsConnector, SheetsError, SpreadsheetInfo,
    SpreadsheetService, WorksheetInfo,
};
use crate::auth::{AccessToken, ServiceAccountAuth};
use crate::config::{AppConfig, ValueInputOption};

/// Authenticates with the service account and opens the configured spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConnector {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    spreadsheet_url: Url,
    value_input_option: ValueInputOption,
}

impl GoogleSheetsConnector {
    pub fn new(config: &AppConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.google.http_timeout_secs))
            .build()?;

        let mut spreadsheet_url = Url::parse(&config.sheets.api_base)?;
        spreadsheet_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&config.sheets.spreadsheet_id);

        Ok(Self {
            auth: ServiceAccountAuth::new(http.clone(), config.google.clone()),
            http,
            spreadsheet_url,
            value_input_option: config.sheets.value_input_option,
        })
    }
}

#[async_trait]
impl SheetsConnector for GoogleSheetsConnector {
    async fn connect(&self) -> Result<Box<dyn SpreadsheetService>, SheetsError> {
        let token = self.auth.access_token().await?;
        Ok(Box::new(GoogleSpreadsheet {
            http: self.http.clone(),
            token,
            spreadsheet_url: self.spreadsheet_url.clone(),
            value_input_option: self.value_input_option,
        }))
    }
}

/// An authenticated handle on one spreadsheet.
pub struct GoogleSpreadsheet {
    http: reqwest::Client,
    token: AccessToken,
    spreadsheet_url: Url,
    value_input_option: ValueInputOption,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResource {
    #[serde(default)]
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// A1 notation for a whole worksheet: `'Sheet Name'` with quotes doubled.
pub fn a1_sheet_name(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl GoogleSpreadsheet {
    fn values_url(&self, range: &str) -> Url {
        let mut url = self.spreadsheet_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("values").push(range);
        }
        url
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .http
            .get(self.values_url(range))
            .bearer_auth(&self.token.token)
            .send()
            .await?;

        let range: ValueRange = read_json(response).await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn header_row(&self, worksheet: &WorksheetInfo) -> Result<Vec<String>, SheetsError> {
        let range = format!("{}!1:1", a1_sheet_name(&worksheet.title));
        let headers = self.get_values(&range).await?.into_iter().next().unwrap_or_default();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SheetsError::MissingHeaderRow(worksheet.title.clone()));
        }
        Ok(headers)
    }
}

#[async_trait]
impl SpreadsheetService for GoogleSpreadsheet {
    async fn load_metadata(&self) -> Result<SpreadsheetInfo, SheetsError> {
        let mut url = self.spreadsheet_url.clone();
        url.query_pairs_mut().append_pair("fields", "properties.title,sheets.properties");

        let response = self.http.get(url).bearer_auth(&self.token.token).send().await?;
        let resource: SpreadsheetResource = read_json(response).await?;

        let worksheets = resource
            .sheets
            .into_iter()
            .map(|sheet| WorksheetInfo {
                sheet_id: sheet.properties.sheet_id,
                title: sheet.properties.title,
                index: sheet.properties.index,
            })
            .collect();

        Ok(SpreadsheetInfo {
            title: resource.properties.title,
            worksheets,
        })
    }

    async fn list_rows(&self, worksheet: &WorksheetInfo) -> Result<SheetRows, SheetsError> {
        let mut values = self.get_values(&a1_sheet_name(&worksheet.title)).await?.into_iter();
        let headers = values.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = values.collect();

        debug!("Read {} rows from worksheet '{}'", rows.len(), worksheet.title);
        Ok(SheetRows { headers, rows })
    }

    async fn append_row(&self, worksheet: &WorksheetInfo, values: &RowValues) -> Result<(), SheetsError> {
        let headers = self.header_row(worksheet).await?;
        let (row, unmatched) = row_in_header_order(&headers, values);
        if !unmatched.is_empty() {
            warn!(
                "Worksheet '{}' has no column for {:?}; those values are not stored",
                worksheet.title, unmatched
            );
        }

        let mut url = self.values_url(&format!("{}:append", a1_sheet_name(&worksheet.title)));
        url.query_pairs_mut()
            .append_pair("valueInputOption", self.value_input_option.as_str())
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token.token)
            .json(&json!({ "majorDimension": "ROWS", "values": [row] }))
            .send()
            .await?;

        let _: Value = read_json(response).await?;
        Ok(())
    }
}

/// Decode a successful body, or turn Google's error envelope into `Upstream`.
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(SheetsError::Upstream {
        status: status.as_u16(),
        message,
    })
}
