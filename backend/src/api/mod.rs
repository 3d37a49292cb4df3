//! Central module for organizing the application's main API endpoints.
//!
//! Each entity gets its own submodule with handlers and routes. Views answer
//! with a `Rendered` document (template name plus context) that a front end
//! renders; successful form submissions answer `302 Found`.

pub mod car;
pub mod driver;
pub mod home;
pub mod manufacturer;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware, Json, Router};
use serde::Serialize;

use crate::errors::AppError;
use crate::{auth, AppState};

/// The `:id` segment of an entity route. A segment that is not an integer
/// names no row, so it is Not-found rather than a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidIdentifier(rejection.body_text()))?;
        raw.parse()
            .map(EntityId)
            .map_err(|_| AppError::InvalidIdentifier(raw))
    }
}

/// A view response: the template to render and its context.
#[derive(Debug, Serialize)]
pub struct Rendered<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C> Rendered<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for Rendered<C> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `302 Found` pointing at `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Every route of the service, with the login gate in front of all but the
/// authentication views.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(home::routes::home_router())
        .merge(manufacturer::routes::manufacturer_router())
        .merge(driver::routes::driver_router())
        .merge(car::routes::car_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    Router::new()
        .merge(protected)
        .merge(auth::auth_router())
        .layer(crate::middleware::http_trace_layer())
        .with_state(state)
}
