//! Global application error types and handlers.
//!
//! `AppError` is what handlers return; its `IntoResponse` impl decides the
//! status code so no handler has to. Form validation failures are not errors
//! here: they are re-rendered forms (see `services::forms`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Result type alias using the application's error type.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// No row with the requested identifier
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Path identifier that is not an integer, treated like an unknown row
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Requested list page that is not a number or lies outside the available range
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Column named by a failed UNIQUE constraint, e.g. `username` for
    /// `UNIQUE constraint failed: drivers.username`.
    pub fn unique_violation(&self) -> Option<&str> {
        match self {
            AppError::Database(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                err.message().rsplit('.').next()
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { .. }
            | AppError::InvalidIdentifier(_)
            | AppError::InvalidPage(_) => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            AppError::Auth(err) => err.into_response(),
            AppError::Database(err) => {
                error!(error = %err, "database failure while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_are_not_found() {
        let responses = [
            AppError::not_found("Car", 7).into_response(),
            AppError::InvalidIdentifier("abc".to_string()).into_response(),
            AppError::InvalidPage("abc".to_string()).into_response(),
        ];
        for response in responses {
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn other_database_errors_are_not_unique_violations() {
        assert_eq!(AppError::Database(sqlx::Error::RowNotFound).unique_violation(), None);
        assert_eq!(AppError::not_found("Car", 7).unique_violation(), None);
    }
}
