//! Mapping of data-access failures onto HTTP responses.
//!
//! JSON routes answer with `{"error": .., "kind": ..}`; page routes render
//! the error inside the normal page chrome.

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use playoffpurge_core::SheetsError;
use serde_json::json;
use tracing::{error, info};

use crate::templates;

pub fn status_for(err: &SheetsError) -> StatusCode {
    match err {
        SheetsError::NotFound(_) => StatusCode::NOT_FOUND,
        SheetsError::Auth(_) | SheetsError::SchemaMismatch(_) | SheetsError::InvalidResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        SheetsError::RateLimited | SheetsError::Server(_) | SheetsError::Network(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn log_error(status: StatusCode, err: &SheetsError) {
    if status == StatusCode::NOT_FOUND {
        info!(error = %err, "Not found");
    } else {
        error!(error = %err, kind = err.kind(), status = status.as_u16(), "Request failed");
    }
}

/// Error for JSON endpoints.
#[derive(Debug)]
pub enum ApiError {
    Upstream(SheetsError),
    /// Malformed path or query parameters.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, kind) = match self {
            ApiError::Upstream(err) => {
                let status = status_for(&err);
                log_error(status, &err);
                (status, err.to_string(), err.kind())
            }
            ApiError::BadRequest(message) => {
                info!(error = %message, "Rejected request parameters");
                (StatusCode::BAD_REQUEST, message, "bad_request")
            }
        };
        let body = json!({
            "error": message,
            "kind": kind,
        });
        (status, Json(body)).into_response()
    }
}

impl From<SheetsError> for ApiError {
    fn from(value: SheetsError) -> Self {
        ApiError::Upstream(value)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error for HTML pages.
#[derive(Debug)]
pub struct PageError {
    pub app_title: String,
    pub error: SheetsError,
}

impl PageError {
    pub fn new(app_title: &str, error: SheetsError) -> Self {
        Self {
            app_title: app_title.to_string(),
            error,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        log_error(status, &self.error);
        let heading = match status {
            StatusCode::NOT_FOUND => "Not found",
            _ => "Could not load league data",
        };
        let content = templates::error_content(heading, &self.error.to_string());
        let page = templates::base_template(heading, &self.app_title, &content, None);
        (status, Html(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(
            status_for(&SheetsError::NotFound("team 9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&SheetsError::Auth("invalid_grant".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SheetsError::SchemaMismatch("missing tab".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SheetsError::RateLimited),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_bad_request_status() {
        let response = ApiError::BadRequest("Invalid URL".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(SheetsError::NotFound("team 9".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
