use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use service::auth::AuthError;
use service::settings::{BulkUpsertError, SettingsError};
use service::uploads::UploadError;

/// JSON error response: `{"error": message, ...extra}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, body: json!({ "error": message.into() }) }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A store failure while reading or writing settings, with `message` as
    /// the client-facing text.
    pub fn settings(message: &str, e: &SettingsError) -> Self {
        let status = match e {
            SettingsError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            SettingsError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SettingsError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            SettingsError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        error!(code = e.code(), error = %e, "{message}");
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<BulkUpsertError> for ApiError {
    fn from(e: BulkUpsertError) -> Self {
        let status = if e.only_caller_errors() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
        error!(failed = ?e.failed_keys(), applied = e.applied.len(), error = %e, "failed to update data");
        Self {
            status,
            body: json!({ "error": "Failed to update data", "failed_keys": e.failed_keys() }),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        warn!(status = %e.status(), error = %e.body_text(), "rejected request body");
        Self::bad_request(e.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(_) => Self::bad_request("Username and password required"),
            AuthError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Invalid username or password"),
            AuthError::Repository(msg) => {
                error!(code = 1200, error = %msg, "login lookup failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Validation(msg) => {
                warn!(%msg, "upload rejected");
                Self::bad_request("No file uploaded")
            }
            UploadError::Io(err) => {
                error!(error = %err, "upload write failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn bulk_error_status_depends_on_cause() {
        let mut failed = BTreeMap::new();
        failed.insert(" ".to_string(), SettingsError::InvalidKey("blank".into()));
        let caller = BulkUpsertError { applied: vec!["a".into()], failed: failed.clone() };
        assert_eq!(ApiError::from(caller).status, StatusCode::BAD_REQUEST);

        failed.insert("b".to_string(), SettingsError::StoreUnavailable("down".into()));
        let store = ApiError::from(BulkUpsertError { applied: vec![], failed });
        assert_eq!(store.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.body["failed_keys"], json!([" ", "b"]));
    }

    #[test]
    fn auth_errors_map_to_client_messages() {
        let e = ApiError::from(AuthError::Unauthorized);
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.body, json!({"error": "Invalid username or password"}));
    }
}
