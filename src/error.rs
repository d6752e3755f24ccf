use std::sync::OnceLock;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Error taxonomy for every route. Business errors carry a client-safe
/// message; anything unexpected becomes `Internal` and is sanitized in
/// production.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            return Self::Conflict("Duplicate value for a unique field".into());
        }
        Self::Internal(e.into())
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

static VERBOSE_ERRORS: OnceLock<bool> = OnceLock::new();

/// Called once at startup; development mode echoes internal error details.
pub fn init_verbose_errors(verbose: bool) {
    let _ = VERBOSE_ERRORS.set(verbose);
}

fn verbose_errors() -> bool {
    *VERBOSE_ERRORS.get().unwrap_or(&false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "unhandled internal error");
                if verbose_errors() {
                    format!("{e:#}")
                } else {
                    "something went very wrong".to_string()
                }
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            status: if status.is_server_error() {
                "error".into()
            } else {
                "fail".into()
            },
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::unauthenticated("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::invalid_token("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn business_errors_serialize_as_fail() {
        let resp = AppError::conflict("Email already exists").into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_serialize_as_error_status() {
        let resp = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
