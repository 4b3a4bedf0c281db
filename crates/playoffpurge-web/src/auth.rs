//! HTTP Basic authentication for admin endpoints.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json, RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

const WWW_AUTHENTICATE_VALUE: &str = "Basic realm=\"playoffpurge\"";

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    WrongCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_message = match self {
            AuthError::MissingCredentials => "Authentication required",
            AuthError::WrongCredentials => "Incorrect username or password",
        };
        let body = Json(json!({
            "error": error_message,
        }));
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_VALUE)],
            body,
        )
            .into_response()
    }
}

/// Compare without short-circuiting on the first differing byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// An authenticated admin. Extracting it rejects the request with 401
/// unless the Basic credentials match the configured admin account.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) = parts
            .extract::<TypedHeader<Authorization<Basic>>>()
            .await
            .map_err(|_| AuthError::MissingCredentials)?;

        let settings = &state.settings;
        let username_ok =
            constant_time_eq(basic.username().as_bytes(), settings.admin_username.as_bytes());
        let password_ok =
            constant_time_eq(basic.password().as_bytes(), settings.admin_password.as_bytes());

        if username_ok & password_ok {
            Ok(AdminUser {
                username: basic.username().to_string(),
            })
        } else {
            warn!(username = %basic.username(), "Rejected admin credentials");
            Err(AuthError::WrongCredentials)
        }
    }
}
