//! Data structures for authentication-related entities.
//!
//! `CurrentSession` is the per-request authentication context: the login gate
//! resolves it once and handlers receive it as an extractor argument.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use crate::database::models::Driver;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub driver: Driver,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

/// Account details for a driver created outside the registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub license_number: Option<&'a str>,
}
