//! Custom error types specific to authentication failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use super::middleware::login_redirect;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Request carried no session, or one that no longer exists
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated => login_redirect(None),
            AuthError::PasswordHash(msg) => {
                error!(error = %msg, "password hashing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
