//! API client for the Google Sheets v4 REST API.
//!
//! Only the read side is used: one `values:batchGet` call per snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::rows::{self, Row, SNAPSHOT_RANGES};
use super::SheetsError;
use crate::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::cache::SnapshotSource;
use crate::config::{Config, Credentials};
use crate::models::LeagueSnapshot;

// ============================================================================
// Constants
// ============================================================================

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    range: String,
    #[serde(default)]
    values: Vec<Row>,
}

/// Tab name from an A1 range as echoed by the API, e.g.
/// `'Roster Notes'!A2:B10` -> `Roster Notes`.
pub(crate) fn tab_name(range: &str) -> String {
    let sheet = match range.rfind('!') {
        Some(idx) => &range[..idx],
        None => range,
    };
    match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => sheet.to_string(),
    }
}

/// How requests are authorized.
#[derive(Clone)]
pub enum SheetsAuth {
    ServiceAccount(Arc<ServiceAccountAuth>),
    ApiKey(String),
}

/// Sheets client for one spreadsheet.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
    sheet_id: String,
    auth: SheetsAuth,
    initial_backoff: Duration,
}

impl SheetsClient {
    pub fn new(sheet_id: impl Into<String>, auth: SheetsAuth) -> Result<Self, SheetsError> {
        Ok(Self::with_http_client(Self::http_client()?, sheet_id, auth))
    }

    fn http_client() -> Result<Client, SheetsError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?)
    }

    fn with_http_client(client: Client, sheet_id: impl Into<String>, auth: SheetsAuth) -> Self {
        Self {
            client,
            base_url: SHEETS_BASE_URL.to_string(),
            sheet_id: sheet_id.into(),
            auth,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    /// Build a client from configuration, loading service-account key
    /// material if that is how credentials were given.
    pub fn from_config(config: &Config) -> Result<Self, SheetsError> {
        let client = Self::http_client()?;
        let auth = match &config.credentials {
            Credentials::ApiKey(key) => SheetsAuth::ApiKey(key.clone()),
            Credentials::ServiceAccountJson(json) => {
                Self::service_account(ServiceAccountKey::from_json(json)?, &client)?
            }
            Credentials::ServiceAccountFile(path) => {
                Self::service_account(ServiceAccountKey::from_file(path)?, &client)?
            }
        };
        Ok(Self::with_http_client(client, config.sheet_id.clone(), auth))
    }

    fn service_account(key: ServiceAccountKey, client: &Client) -> Result<SheetsAuth, SheetsError> {
        let auth = ServiceAccountAuth::new(key, client.clone())?;
        info!(client_email = %auth.client_email(), "Using service account credentials");
        Ok(SheetsAuth::ServiceAccount(Arc::new(auth)))
    }

    /// Point the client somewhere other than `sheets.googleapis.com`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, SheetsError> {
        match &self.auth {
            SheetsAuth::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            SheetsAuth::ServiceAccount(auth) => Ok(request.bearer_auth(auth.access_token().await?)),
        }
    }

    /// Fetch several A1 ranges in one call, keyed by tab name.
    ///
    /// Every requested tab must come back; a missing one is reported as a
    /// schema mismatch.
    pub async fn fetch_ranges(
        &self,
        ranges: &[String],
    ) -> Result<HashMap<String, Vec<Row>>, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchGet",
            self.base_url, self.sheet_id
        );
        let mut query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", r.as_str())).collect();
        query.push(("majorDimension", "ROWS"));
        query.push(("valueRenderOption", "UNFORMATTED_VALUE"));

        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        let response = loop {
            let request = self.authorize(self.client.get(&url).query(&query)).await?;
            let response = request.send().await?;

            let status = response.status();
            if status.is_success() {
                break response;
            }
            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(SheetsError::RateLimited);
                }
                warn!(retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                tokio::time::sleep(backoff).await;
                backoff *= 2; // Exponential backoff
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let err = SheetsError::from_status(status, &body);
            if let (SheetsError::Auth(_), SheetsAuth::ServiceAccount(auth)) = (&err, &self.auth) {
                // Revoked or rotated keys: make the next attempt start over
                auth.clear().await;
            }
            return Err(err);
        };

        let parsed: BatchGetResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(format!("batchGet response: {}", e)))?;

        let mut tabs: HashMap<String, Vec<Row>> = HashMap::with_capacity(parsed.value_ranges.len());
        for value_range in parsed.value_ranges {
            debug!(range = %value_range.range, rows = value_range.values.len(), "Fetched range");
            tabs.insert(tab_name(&value_range.range), value_range.values);
        }

        for requested in ranges {
            let tab = tab_name(requested);
            if !tabs.contains_key(&tab) {
                return Err(SheetsError::SchemaMismatch(format!(
                    "range '{}' missing from response",
                    requested
                )));
            }
        }

        Ok(tabs)
    }

    /// Fetch and parse the whole league in one API call.
    pub async fn fetch_snapshot(&self) -> Result<LeagueSnapshot, SheetsError> {
        let ranges: Vec<String> = SNAPSHOT_RANGES.iter().map(|r| r.a1()).collect();
        let tabs = self.fetch_ranges(&ranges).await?;
        let snapshot = rows::build_snapshot(&tabs)?;

        info!(
            teams = snapshot.teams.len(),
            roster_entries = snapshot.rosters.len(),
            requirements = snapshot.requirements.len(),
            week = %snapshot.meta.current_week,
            "Loaded league snapshot"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for SheetsClient {
    async fn fetch_snapshot(&self) -> Result<LeagueSnapshot, SheetsError> {
        SheetsClient::fetch_snapshot(self).await
    }
}
