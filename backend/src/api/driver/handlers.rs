//! Handler functions for driver views.
//!
//! Drivers are created through a registration form (two password fields),
//! while the update view only changes the licence number.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{found, EntityId, Rendered};
use crate::auth::models::Registration;
use crate::auth::service;
use crate::database::models::{CarWithManufacturer, Driver};
use crate::database::queries;
use crate::errors::{AppError, Result};
use crate::services::forms::{DriverCreationForm, DriverLicenseUpdateForm, FormErrors};
use crate::services::pagination::{PageInfo, Pagination};
use crate::services::search::{contains_pattern, SearchForm};
use crate::AppState;

const LIST_URL: &str = "/drivers/";
const FORM_TEMPLATE: &str = "taxi/driver_form.html";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const LICENSE_TAKEN: &str = "Driver with this License number already exists.";

/// Form field and message for a UNIQUE violation on the drivers table, so a
/// lost race against a concurrent submission still re-renders the form.
fn taken_field(err: &AppError) -> Option<(&'static str, &'static str)> {
    match err.unique_violation()? {
        "username" => Some(("username", USERNAME_TAKEN)),
        "license_number" => Some(("license_number", LICENSE_TAKEN)),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverQuery {
    username: Option<String>,
    page: Option<String>,
}

#[derive(Serialize)]
struct ListContext {
    driver_list: Vec<Driver>,
    search_form: SearchForm,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Serialize)]
struct DetailContext {
    driver: Driver,
    cars: Vec<CarWithManufacturer>,
}

#[derive(Serialize)]
struct FormContext<F> {
    object: Option<Driver>,
    form: F,
    errors: FormErrors,
}

#[derive(Serialize)]
struct DeleteContext {
    driver: Driver,
}

async fn load(state: &AppState, id: i64) -> Result<Driver> {
    queries::find_driver(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Driver", id))
}

pub async fn driver_list(
    State(state): State<AppState>,
    Query(query): Query<DriverQuery>,
) -> Result<Rendered<impl Serialize>> {
    let term = query.username.unwrap_or_default();
    let pattern = contains_pattern(&term);

    let total = queries::count_drivers(&state.pool, &pattern).await?;
    let page_size = state.settings.pagination.page_size;
    let page = PageInfo::resolve(total, query.page.as_deref(), page_size)?;
    let driver_list =
        queries::list_drivers(&state.pool, &pattern, page.limit(), page.offset()).await?;

    Ok(Rendered::new(
        "taxi/driver_list.html",
        ListContext {
            driver_list,
            search_form: SearchForm::new("username", &term),
            pagination: page.into(),
        },
    ))
}

pub async fn driver_detail(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let driver = load(&state, id).await?;
    let cars = queries::cars_of_driver(&state.pool, id).await?;
    Ok(Rendered::new("taxi/driver_detail.html", DetailContext { driver, cars }))
}

pub async fn driver_create_form() -> Rendered<impl Serialize> {
    Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: None,
            form: DriverCreationForm::default(),
            errors: FormErrors::default(),
        },
    )
}

pub async fn driver_create(
    State(state): State<AppState>,
    Form(form): Form<DriverCreationForm>,
) -> Result<Response> {
    let mut errors = form.validate();
    let username = form.username.trim();
    let license_number = form.license_number.trim();

    if !errors.has("username")
        && queries::find_driver_by_username(&state.pool, username)
            .await?
            .is_some()
    {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.has("license_number")
        && queries::license_taken(&state.pool, license_number, None).await?
    {
        errors.add("license_number", LICENSE_TAKEN);
    }

    if errors.is_empty() {
        let registered = service::register_driver(
            &state.pool,
            Registration {
                username,
                password: &form.password1,
                first_name: form.first_name.trim(),
                last_name: form.last_name.trim(),
                license_number: Some(license_number),
            },
        )
        .await;
        match registered {
            Ok(driver) => {
                info!(driver_id = driver.id, "driver created through registration form");
                return Ok(found(LIST_URL));
            }
            Err(err) => match taken_field(&err) {
                Some((field, message)) => errors.add(field, message),
                None => return Err(err),
            },
        }
    }

    let context = FormContext {
        object: None,
        form,
        errors,
    };
    Ok(Rendered::new(FORM_TEMPLATE, context).into_response())
}

pub async fn driver_update_form(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let driver = load(&state, id).await?;
    let form = DriverLicenseUpdateForm {
        license_number: driver.license_number.clone().unwrap_or_default(),
    };
    Ok(Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: Some(driver),
            form,
            errors: FormErrors::default(),
        },
    ))
}

pub async fn driver_update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Form(form): Form<DriverLicenseUpdateForm>,
) -> Result<Response> {
    let driver = load(&state, id).await?;

    let license_number = form.license_number.trim();

    let mut errors = form.validate();
    if !errors.has("license_number")
        && queries::license_taken(&state.pool, license_number, Some(id)).await?
    {
        errors.add("license_number", LICENSE_TAKEN);
    }

    if errors.is_empty() {
        match queries::update_driver_license(&state.pool, id, license_number).await {
            Ok(true) => {
                info!(driver_id = id, "driver license updated");
                return Ok(found(LIST_URL));
            }
            Ok(false) => return Err(AppError::not_found("Driver", id)),
            Err(err) => match taken_field(&err) {
                Some((field, message)) => errors.add(field, message),
                None => return Err(err),
            },
        }
    }

    let context = FormContext {
        object: Some(driver),
        form,
        errors,
    };
    Ok(Rendered::new(FORM_TEMPLATE, context).into_response())
}

pub async fn driver_confirm_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let driver = load(&state, id).await?;
    Ok(Rendered::new(
        "taxi/driver_confirm_delete.html",
        DeleteContext { driver },
    ))
}

pub async fn driver_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    if !queries::delete_driver(&state.pool, id).await? {
        return Err(AppError::not_found("Driver", id));
    }
    info!(driver_id = id, "driver deleted");
    Ok(found(LIST_URL))
}
