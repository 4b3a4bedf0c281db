use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::sheets::SheetsError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The app only ever reads the sheet.
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion. Google caps this at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Renew access tokens this long before they expire.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 300;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account key file that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SheetsError> {
        serde_json::from_str(json)
            .map_err(|e| SheetsError::Auth(format!("invalid service account JSON: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SheetsError::Auth(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// A bearer token obtained from the token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the token will expire soon and should be renewed
    pub fn needs_refresh(&self) -> bool {
        let refresh_at = self.expires_at - Duration::seconds(TOKEN_REFRESH_BUFFER_SECS);
        Utc::now() > refresh_at
    }
}

/// Exchanges signed service-account assertions for access tokens and keeps
/// the current token in memory.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
    token: Mutex<Option<AccessToken>>,
}

impl ServiceAccountAuth {
    /// Validates the private key up front so bad key material fails at startup.
    pub fn new(key: ServiceAccountKey, client: Client) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Auth(format!("invalid service account private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            client,
            token: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {}", e)))
    }

    /// Current access token, exchanging a fresh assertion when the cached one
    /// is missing or close to expiry.
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut slot = self.token.lock().await;
        if let Some(ref token) = *slot {
            if !token.needs_refresh() {
                return Ok(token.token.clone());
            }
            if token.is_expired() {
                debug!("Service account token expired, renewing");
            } else {
                debug!("Service account token close to expiry, renewing");
            }
        }

        let token = self.exchange().await?;
        let value = token.token.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next request exchanges a new one.
    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }

    async fn exchange(&self) -> Result<AccessToken, SheetsError> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                // The token endpoint answers bad grants with 400 invalid_grant
                400 => SheetsError::Auth(crate::utils::truncate_string(&body, 500)),
                _ => SheetsError::from_status(status, &body),
            });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(format!("token response: {}", e)))?;

        info!(client_email = %self.key.client_email, expires_in = parsed.expires_in, "Obtained service account access token");

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }
}
