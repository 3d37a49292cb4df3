use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    car_confirm_delete, car_create, car_create_form, car_delete, car_detail, car_list,
    car_update, car_update_form, toggle_assign,
};
use crate::AppState;

pub fn car_router() -> Router<AppState> {
    Router::new()
        .route("/cars/", get(car_list))
        .route("/cars/create/", get(car_create_form).post(car_create))
        .route("/cars/:id/", get(car_detail))
        .route("/cars/:id/update/", get(car_update_form).post(car_update))
        .route("/cars/:id/delete/", get(car_confirm_delete).post(car_delete))
        .route("/cars/:id/toggle-assign/", post(toggle_assign))
}
