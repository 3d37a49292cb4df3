use axum::routing::get;
use axum::Router;

use super::handlers::index;
use crate::AppState;

pub fn home_router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
