use axum::routing::get;
use axum::Router;

use super::handlers::{
    driver_confirm_delete, driver_create, driver_create_form, driver_delete, driver_detail,
    driver_list, driver_update, driver_update_form,
};
use crate::AppState;

pub fn driver_router() -> Router<AppState> {
    Router::new()
        .route("/drivers/", get(driver_list))
        .route("/drivers/create/", get(driver_create_form).post(driver_create))
        .route("/drivers/:id/", get(driver_detail))
        .route(
            "/drivers/:id/update/",
            get(driver_update_form).post(driver_update),
        )
        .route(
            "/drivers/:id/delete/",
            get(driver_confirm_delete).post(driver_delete),
        )
}
