use axum::routing::get;
use axum::Router;

use super::handlers::{
    manufacturer_confirm_delete, manufacturer_create, manufacturer_create_form,
    manufacturer_delete, manufacturer_list, manufacturer_update, manufacturer_update_form,
};
use crate::AppState;

pub fn manufacturer_router() -> Router<AppState> {
    Router::new()
        .route("/manufacturers/", get(manufacturer_list))
        .route(
            "/manufacturers/create/",
            get(manufacturer_create_form).post(manufacturer_create),
        )
        .route(
            "/manufacturers/:id/update/",
            get(manufacturer_update_form).post(manufacturer_update),
        )
        .route(
            "/manufacturers/:id/delete/",
            get(manufacturer_confirm_delete).post(manufacturer_delete),
        )
}
