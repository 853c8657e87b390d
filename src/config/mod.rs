use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use std::fmt;
use tracing::warn;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_SYNC_PATH: &str = "/sheet-sync";
pub const HEALTH_PATH: &str = "/health";

/// Process-wide configuration. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub sync_path: String,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub service_account_email: String,
    pub private_key: PrivateKey,
    pub token_uri: String,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub api_base: String,
    pub value_input_option: ValueInputOption,
}

/// How the Sheets API interprets appended cell values.
///
/// `Raw` stores the text as sent. `UserEntered` lets Sheets parse it, so
/// `true` comes back as `TRUE`, `1.0` as `1` and `=...` is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    Raw,
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RAW" => Some(ValueInputOption::Raw),
            "USER_ENTERED" => Some(ValueInputOption::UserEntered),
            _ => None,
        }
    }
}

/// Service-account private key.
///
/// A key that could not be decoded is kept as `Invalid` rather than failing
/// startup: the problem surfaces as an authentication error on first use.
#[derive(Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Pem(String),
    Invalid(String),
}

impl PrivateKey {
    /// PEM text with literal `\n` sequences, as stored in most env dashboards.
    pub fn from_escaped(raw: &str) -> Self {
        PrivateKey::Pem(raw.replace("\\n", "\n"))
    }

    /// Base64-encoded PEM.
    pub fn from_base64(raw: &str) -> Self {
        let compact: String = raw.split_whitespace().collect();
        let bytes = match STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => return PrivateKey::Invalid(format!("private key is not valid base64: {}", e)),
        };
        match String::from_utf8(bytes) {
            Ok(pem) => Self::from_escaped(&pem),
            Err(_) => PrivateKey::Invalid("decoded private key is not UTF-8".to_string()),
        }
    }

    pub fn pem(&self) -> Result<&str, &str> {
        match self {
            PrivateKey::Pem(pem) => Ok(pem.as_str()),
            PrivateKey::Invalid(reason) => Err(reason.as_str()),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateKey::Pem(pem) if pem.is_empty() => f.write_str("PrivateKey(<empty>)"),
            PrivateKey::Pem(_) => f.write_str("PrivateKey(<redacted>)"),
            PrivateKey::Invalid(reason) => write!(f, "PrivateKey::Invalid({})", reason),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::defaults();

        // Server
        if let Some(v) = var("SHEET_SYNC_BIND") {
            config.server.bind = v;
        }
        if let Some(v) = var("SHEET_SYNC_PORT").or_else(|| var("PORT")) {
            config.server.port = v.parse().unwrap_or(config.server.port);
        }
        if let Some(v) = var("SHEET_SYNC_PATH") {
            let path = normalize_path(&v);
            if path == HEALTH_PATH {
                warn!("SHEET_SYNC_PATH {} is reserved, using {}", path, DEFAULT_SYNC_PATH);
            } else {
                config.server.sync_path = path;
            }
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            config.server.max_request_size_bytes = v.parse().unwrap_or(config.server.max_request_size_bytes);
        }

        // Google credentials
        if let Some(v) = var("GOOGLE_SERVICE_ACCOUNT_EMAIL") {
            config.google.service_account_email = v.trim().to_string();
        }
        if let Some(v) = var("GOOGLE_PRIVATE_KEY_BASE64") {
            config.google.private_key = PrivateKey::from_base64(&v);
        } else if let Some(v) = var("GOOGLE_PRIVATE_KEY") {
            config.google.private_key = PrivateKey::from_escaped(&v);
        }
        if let Some(v) = var("GOOGLE_TOKEN_URI") {
            config.google.token_uri = v;
        }
        if let Some(v) = var("GOOGLE_HTTP_TIMEOUT_SECS") {
            config.google.http_timeout_secs = v.parse().unwrap_or(config.google.http_timeout_secs);
        }

        // Spreadsheet
        if let Some(v) = var("SHEET_ID") {
            config.sheets.spreadsheet_id = v.trim().to_string();
        }
        if let Some(v) = var("GOOGLE_SHEETS_API_BASE") {
            config.sheets.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = var("SHEETS_VALUE_INPUT_OPTION") {
            config.sheets.value_input_option =
                ValueInputOption::parse(&v).unwrap_or(config.sheets.value_input_option);
        }

        config
    }

    fn defaults() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 8888,
                sync_path: DEFAULT_SYNC_PATH.to_string(),
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            google: GoogleConfig {
                service_account_email: String::new(),
                private_key: PrivateKey::Pem(String::new()),
                token_uri: DEFAULT_TOKEN_URI.to_string(),
                http_timeout_secs: 30,
            },
            sheets: SheetsConfig {
                spreadsheet_id: String::new(),
                api_base: DEFAULT_SHEETS_API_BASE.to_string(),
                value_input_option: ValueInputOption::Raw,
            },
        }
    }

    /// Names of credential settings that are missing or unusable.
    /// Only used for startup warnings; nothing is rejected here.
    pub fn credential_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.google.service_account_email.is_empty() {
            warnings.push("GOOGLE_SERVICE_ACCOUNT_EMAIL is not set".to_string());
        }
        match &self.google.private_key {
            PrivateKey::Pem(pem) if pem.trim().is_empty() => {
                warnings.push("GOOGLE_PRIVATE_KEY / GOOGLE_PRIVATE_KEY_BASE64 is not set".to_string())
            }
            PrivateKey::Invalid(reason) => warnings.push(reason.clone()),
            PrivateKey::Pem(_) => {}
        }
        if self.sheets.spreadsheet_id.is_empty() {
            warnings.push("SHEET_ID is not set".to_string());
        }
        warnings
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
