//! Handler functions for login and logout.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::middleware::{safe_next, LOGIN_URL};
use super::models::{LoginForm, SESSION_COOKIE};
use super::service;
use crate::api::{found, Rendered};
use crate::errors::Result;
use crate::services::forms::{FormErrors, NON_FIELD_ERRORS};
use crate::AppState;

const LOGIN_TEMPLATE: &str = "registration/login.html";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

#[derive(Serialize)]
struct LoginContext {
    form: LoginForm,
    errors: FormErrors,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Rendered<impl Serialize> {
    Rendered::new(
        LOGIN_TEMPLATE,
        LoginContext {
            form: LoginForm {
                next: query.next,
                ..Default::default()
            },
            errors: FormErrors::default(),
        },
    )
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let driver = service::authenticate(&state.pool, form.username.trim(), &form.password).await?;

    let Some(driver) = driver else {
        let mut errors = FormErrors::default();
        errors.add(
            NON_FIELD_ERRORS,
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        return Ok(Rendered::new(LOGIN_TEMPLATE, LoginContext { form, errors }).into_response());
    };

    let token = service::start_session(&state.pool, driver.id).await?;
    info!(driver_id = driver.id, "driver logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), found(safe_next(form.next.as_deref()))).into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        service::end_session(&state.pool, cookie.value()).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, found(LOGIN_URL)).into_response())
}
