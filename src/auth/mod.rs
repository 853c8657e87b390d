// Google service-account authentication (OAuth2 JWT bearer grant)

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GoogleConfig;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google caps assertion lifetime at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Failed to sign assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(client_email: &str, token_uri: &str) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp();

        Self {
            iss: client_email.to_string(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: token_uri.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Short-lived OAuth2 access token.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Option<i64>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Build and sign the RS256 assertion for the configured service account.
pub fn sign_assertion(config: &GoogleConfig) -> Result<String, AuthError> {
    if config.service_account_email.is_empty() {
        return Err(AuthError::MissingCredential("GOOGLE_SERVICE_ACCOUNT_EMAIL"));
    }

    let pem = config
        .private_key
        .pem()
        .map_err(|reason| AuthError::InvalidPrivateKey(reason.to_string()))?;
    if pem.trim().is_empty() {
        return Err(AuthError::MissingCredential("GOOGLE_PRIVATE_KEY"));
    }

    let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| AuthError::InvalidPrivateKey(e.to_string()))?;

    let claims = Claims::new(&config.service_account_email, &config.token_uri);
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key).map_err(AuthError::Signing)
}

/// Exchanges signed assertions for access tokens. A new token is requested
/// on every call.
#[derive(Debug, Clone)]
pub struct ServiceAccountAuth {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl ServiceAccountAuth {
    pub fn new(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self { http, config }
    }

    pub async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let assertion = sign_assertion(&self.config)?;

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(AuthError::Rejected { status: status.as_u16(), message });
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            "Obtained access token for {} (expires in {:?}s)",
            self.config.service_account_email, token.expires_in
        );

        Ok(AccessToken {
            token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}
