//! Middleware for protecting authenticated routes.
//!
//! `require_login` resolves the `sessionid` cookie to a `CurrentSession` and
//! stores it in the request extensions. Requests without a live session are
//! redirected to the login page with the original path in `next`.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tracing::debug;

use super::models::SESSION_COOKIE;
use super::service;
use crate::api::found;
use crate::AppState;

pub const LOGIN_URL: &str = "/accounts/login/";

pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
        debug!(path = %request.uri().path(), "no session cookie");
        return login_redirect(Some(request.uri()));
    };

    match service::resolve_session(&state.pool, &token).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(None) => {
            debug!(path = %request.uri().path(), "stale session cookie");
            login_redirect(Some(request.uri()))
        }
        Err(err) => err.into_response(),
    }
}

/// 302 to the login page, remembering where the user was headed.
pub fn login_redirect(from: Option<&Uri>) -> Response {
    match from.and_then(Uri::path_and_query) {
        Some(target) => {
            let next = utf8_percent_encode(target.as_str(), NON_ALPHANUMERIC);
            found(&format!("{LOGIN_URL}?next={next}"))
        }
        None => found(LOGIN_URL),
    }
}

/// Only local absolute paths are accepted as post-login targets.
///
/// Browsers drop tabs and newlines while parsing a URL, so `/\t/host` would be
/// followed as `//host`; any whitespace or control character rejects the path.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    if HeaderValue::from_str(path).is_err() {
        return false;
    }
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.contains("://")
}
