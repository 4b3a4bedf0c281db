use thiserror::Error;

use crate::utils::truncate_string;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Google authentication failed: {0}")]
    Auth(String),

    #[error("Sheet layout mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by the Sheets API - please wait before retrying")]
    RateLimited,

    #[error("Sheets API server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Message Google returns when a tab named in a range does not exist
const UNPARSEABLE_RANGE: &str = "Unable to parse range";

impl SheetsError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = truncate_string(body, MAX_ERROR_BODY_LENGTH);
        match status.as_u16() {
            400 if body.contains(UNPARSEABLE_RANGE) => SheetsError::SchemaMismatch(truncated),
            401 | 403 => SheetsError::Auth(truncated),
            404 => SheetsError::NotFound(format!("spreadsheet: {}", truncated)),
            429 => SheetsError::RateLimited,
            500..=599 => SheetsError::Server(truncated),
            _ => SheetsError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Short machine-readable category, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SheetsError::Auth(_) => "upstream_auth",
            SheetsError::SchemaMismatch(_) => "schema_mismatch",
            SheetsError::NotFound(_) => "not_found",
            SheetsError::RateLimited | SheetsError::Server(_) | SheetsError::Network(_) => {
                "upstream_unreachable"
            }
            SheetsError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// True for failures that are likely to clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SheetsError::RateLimited | SheetsError::Server(_) | SheetsError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            SheetsError::from_status(StatusCode::UNAUTHORIZED, ""),
            SheetsError::Auth(_)
        ));
        assert!(matches!(
            SheetsError::from_status(StatusCode::FORBIDDEN, "caller lacks permission"),
            SheetsError::Auth(_)
        ));
        assert!(matches!(
            SheetsError::from_status(StatusCode::NOT_FOUND, ""),
            SheetsError::NotFound(_)
        ));
        assert!(matches!(
            SheetsError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            SheetsError::RateLimited
        ));
        assert!(matches!(
            SheetsError::from_status(StatusCode::SERVICE_UNAVAILABLE, "backend"),
            SheetsError::Server(_)
        ));
        assert!(matches!(
            SheetsError::from_status(StatusCode::IM_A_TEAPOT, ""),
            SheetsError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_bad_range_is_schema_mismatch() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: Teams!A2:G100"}}"#;
        let err = SheetsError::from_status(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, SheetsError::SchemaMismatch(_)));
        assert_eq!(err.kind(), "schema_mismatch");

        let other = SheetsError::from_status(StatusCode::BAD_REQUEST, "bad value");
        assert!(matches!(other, SheetsError::InvalidResponse(_)));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        match SheetsError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            SheetsError::Server(msg) => assert!(msg.len() < 600),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_transient_errors() {
        assert!(SheetsError::RateLimited.is_transient());
        assert!(SheetsError::Server(String::new()).is_transient());
        assert!(!SheetsError::Auth(String::new()).is_transient());
        assert!(!SheetsError::SchemaMismatch(String::new()).is_transient());
    }
}
