//! Defines the HTTP routes for authentication.
//!
//! These routes stay outside the login gate; everything else is mounted
//! behind `middleware::require_login`.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{login, login_page, logout};
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/accounts/login/", get(login_page).post(login))
        .route("/accounts/logout/", post(logout))
}
