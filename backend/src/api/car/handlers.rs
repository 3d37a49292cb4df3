//! Handler functions for car views.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{found, EntityId, Rendered};
use crate::auth::CurrentSession;
use crate::database::models::{CarWithManufacturer, Driver, Manufacturer};
use crate::database::queries;
use crate::errors::{AppError, Result};
use crate::services::assignment;
use crate::services::forms::{CarForm, FormErrors, INVALID_CHOICE};
use crate::services::pagination::{PageInfo, Pagination};
use crate::services::search::{contains_pattern, SearchForm};
use crate::AppState;

const LIST_URL: &str = "/cars/";
const FORM_TEMPLATE: &str = "taxi/car_form.html";

#[derive(Debug, Default, Deserialize)]
pub struct CarQuery {
    model: Option<String>,
    page: Option<String>,
}

#[derive(Serialize)]
struct ListContext {
    car_list: Vec<CarWithManufacturer>,
    search_form: SearchForm,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Serialize)]
struct DetailContext {
    car: CarWithManufacturer,
    drivers: Vec<Driver>,
    /// Whether the logged-in driver is among `drivers`
    is_assigned: bool,
}

/// Choices offered by the form's select widgets.
#[derive(Serialize)]
struct Choices {
    manufacturers: Vec<Manufacturer>,
    drivers: Vec<Driver>,
}

#[derive(Serialize)]
struct FormContext {
    object: Option<CarWithManufacturer>,
    form: CarForm,
    errors: FormErrors,
    choices: Choices,
}

#[derive(Serialize)]
struct DeleteContext {
    car: CarWithManufacturer,
}

async fn load(state: &AppState, id: i64) -> Result<CarWithManufacturer> {
    queries::find_car(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Car", id))
}

async fn choices(state: &AppState) -> Result<Choices> {
    Ok(Choices {
        manufacturers: queries::all_manufacturers(&state.pool).await?,
        drivers: queries::all_drivers(&state.pool).await?,
    })
}

/// Field checks plus the references that need the database. Returns the
/// manufacturer id and driver ids when the form is valid.
async fn validate(
    state: &AppState,
    form: &CarForm,
) -> Result<(Option<(i64, Vec<i64>)>, FormErrors)> {
    let (manufacturer_id, mut errors) = form.validate();

    if let Some(id) = manufacturer_id {
        if queries::find_manufacturer(&state.pool, id).await?.is_none() {
            errors.add("manufacturer", INVALID_CHOICE);
        }
    }

    let driver_ids = form.driver_ids();
    let existing = queries::existing_driver_ids(&state.pool, &driver_ids).await?;
    if let Some(missing) = driver_ids.iter().find(|&&id| !existing.contains(&id)) {
        errors.add(
            "drivers",
            format!("Select a valid choice. {missing} is not one of the available choices."),
        );
    }

    match manufacturer_id {
        Some(id) if errors.is_empty() => Ok((Some((id, driver_ids)), errors)),
        _ => Ok((None, errors)),
    }
}

pub async fn car_list(
    State(state): State<AppState>,
    Query(query): Query<CarQuery>,
) -> Result<Rendered<impl Serialize>> {
    let term = query.model.unwrap_or_default();
    let pattern = contains_pattern(&term);

    let total = queries::count_cars(&state.pool, &pattern).await?;
    let page_size = state.settings.pagination.page_size;
    let page = PageInfo::resolve(total, query.page.as_deref(), page_size)?;
    let car_list = queries::list_cars(&state.pool, &pattern, page.limit(), page.offset()).await?;

    Ok(Rendered::new(
        "taxi/car_list.html",
        ListContext {
            car_list,
            search_form: SearchForm::new("model", &term),
            pagination: page.into(),
        },
    ))
}

pub async fn car_detail(
    State(state): State<AppState>,
    session: CurrentSession,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let car = load(&state, id).await?;
    let drivers = queries::drivers_of_car(&state.pool, id).await?;
    let is_assigned = drivers.iter().any(|driver| driver.id == session.driver.id);

    Ok(Rendered::new(
        "taxi/car_detail.html",
        DetailContext {
            car,
            drivers,
            is_assigned,
        },
    ))
}

pub async fn car_create_form(State(state): State<AppState>) -> Result<Rendered<impl Serialize>> {
    Ok(Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: None,
            form: CarForm::default(),
            errors: FormErrors::default(),
            choices: choices(&state).await?,
        },
    ))
}

pub async fn car_create(
    State(state): State<AppState>,
    Form(form): Form<CarForm>,
) -> Result<Response> {
    let (valid, errors) = validate(&state, &form).await?;
    let Some((manufacturer_id, driver_ids)) = valid else {
        let context = FormContext {
            object: None,
            form,
            errors,
            choices: choices(&state).await?,
        };
        return Ok(Rendered::new(FORM_TEMPLATE, context).into_response());
    };

    let mut tx = state.pool.begin().await?;
    let id = queries::insert_car(&mut *tx, form.model.trim(), manufacturer_id).await?;
    assignment::set_car_drivers(&mut tx, id, &driver_ids).await?;
    tx.commit().await?;

    info!(car_id = id, manufacturer_id, drivers = driver_ids.len(), "car created");
    Ok(found(LIST_URL))
}

pub async fn car_update_form(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let car = load(&state, id).await?;
    let drivers = queries::drivers_of_car(&state.pool, id).await?;
    let form = CarForm {
        model: car.car.model.clone(),
        manufacturer: car.manufacturer.id.to_string(),
        drivers: drivers.iter().map(|driver| driver.id.to_string()).collect(),
    };

    Ok(Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: Some(car),
            form,
            errors: FormErrors::default(),
            choices: choices(&state).await?,
        },
    ))
}

pub async fn car_update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Form(form): Form<CarForm>,
) -> Result<Response> {
    let car = load(&state, id).await?;

    let (valid, errors) = validate(&state, &form).await?;
    let Some((manufacturer_id, driver_ids)) = valid else {
        let context = FormContext {
            object: Some(car),
            form,
            errors,
            choices: choices(&state).await?,
        };
        return Ok(Rendered::new(FORM_TEMPLATE, context).into_response());
    };

    let mut tx = state.pool.begin().await?;
    if !queries::update_car(&mut *tx, id, form.model.trim(), manufacturer_id).await? {
        return Err(AppError::not_found("Car", id));
    }
    assignment::set_car_drivers(&mut tx, id, &driver_ids).await?;
    tx.commit().await?;

    info!(car_id = id, manufacturer_id, drivers = driver_ids.len(), "car updated");
    Ok(found(&format!("/cars/{id}/")))
}

pub async fn car_confirm_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let car = load(&state, id).await?;
    Ok(Rendered::new("taxi/car_confirm_delete.html", DeleteContext { car }))
}

pub async fn car_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    if !queries::delete_car(&state.pool, id).await? {
        return Err(AppError::not_found("Car", id));
    }
    info!(car_id = id, "car deleted");
    Ok(found(LIST_URL))
}

/// Assign the logged-in driver to the car, or release them if already assigned.
pub async fn toggle_assign(
    State(state): State<AppState>,
    session: CurrentSession,
    EntityId(id): EntityId,
) -> Result<Response> {
    assignment::toggle_assignment(&state.pool, session.driver.id, id).await?;
    Ok(found(&format!("/cars/{id}/")))
}
