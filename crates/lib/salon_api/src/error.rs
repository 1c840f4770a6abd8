//! Application error types.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            AppError::Internal(detail) => {
                // Detail stays server-side.
                error!(%detail, "request failed with internal error");
                "Server error".to_string()
            }
            AppError::Validation(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::RateLimited(m) => m,
        };
        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<salon_core::store::StoreError> for AppError {
    fn from(e: salon_core::store::StoreError) -> Self {
        match e {
            salon_core::store::StoreError::Duplicate(field) if field == "email" => {
                AppError::Conflict("Email already exists".into())
            }
            salon_core::store::StoreError::Duplicate(field) => {
                AppError::Conflict(format!("Duplicate value for {field}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<salon_core::auth::AuthError> for AppError {
    fn from(e: salon_core::auth::AuthError) -> Self {
        match e {
            salon_core::auth::AuthError::CredentialError => {
                AppError::Unauthorized("Invalid credentials".into())
            }
            salon_core::auth::AuthError::AccountInactive => {
                AppError::Forbidden("Account inactive".into())
            }
            salon_core::auth::AuthError::ValidationError(msg) => AppError::Validation(msg),
            salon_core::auth::AuthError::TokenError(msg) => AppError::Internal(msg),
            salon_core::auth::AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        // Wrong content type, bad syntax and type mismatches all surface as 400.
        AppError::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::auth::AuthError;
    use salon_core::store::StoreError;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let (status, json) = body_json(AppError::Internal("pool timed out at 10.0.0.3".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "Server error");
    }

    #[tokio::test]
    async fn validation_message_is_returned() {
        let (status, json) = body_json(AppError::Validation("Invalid role value".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid role value");
    }

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let err = AppError::from(StoreError::Duplicate("email".into()));
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Email already exists"));
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn json_rejection_renders_as_validation_error() {
        use axum::extract::{FromRequest, Request};

        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"email": 5}"#))
            .unwrap();
        let rejection = Json::<std::collections::HashMap<String, String>>::from_request(req, &())
            .await
            .unwrap_err();
        let (status, json) = body_json(AppError::from(rejection)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert!(!json["message"].as_str().unwrap().is_empty());
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            AppError::from(AuthError::CredentialError).status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::AccountInactive).status_and_code().0,
            StatusCode::FORBIDDEN
        );
    }
}
