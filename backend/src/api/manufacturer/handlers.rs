//! Handler functions for manufacturer views.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{found, EntityId, Rendered};
use crate::database::models::Manufacturer;
use crate::database::queries;
use crate::errors::{AppError, Result};
use crate::services::forms::{FormErrors, ManufacturerForm};
use crate::services::pagination::{PageInfo, Pagination};
use crate::services::search::{contains_pattern, SearchForm};
use crate::AppState;

const LIST_URL: &str = "/manufacturers/";
const FORM_TEMPLATE: &str = "taxi/manufacturer_form.html";
const NAME_TAKEN: &str = "Manufacturer with this Name already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct ManufacturerQuery {
    name: Option<String>,
    page: Option<String>,
}

#[derive(Serialize)]
struct ListContext {
    manufacturer_list: Vec<Manufacturer>,
    search_form: SearchForm,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Serialize)]
struct FormContext {
    object: Option<Manufacturer>,
    form: ManufacturerForm,
    errors: FormErrors,
}

#[derive(Serialize)]
struct DeleteContext {
    manufacturer: Manufacturer,
}

async fn load(state: &AppState, id: i64) -> Result<Manufacturer> {
    queries::find_manufacturer(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Manufacturer", id))
}

async fn validate(
    state: &AppState,
    form: &ManufacturerForm,
    id: Option<i64>,
) -> Result<FormErrors> {
    let mut errors = form.validate();
    if !errors.has("name")
        && queries::manufacturer_name_taken(&state.pool, form.name.trim(), id).await?
    {
        errors.add("name", NAME_TAKEN);
    }
    Ok(errors)
}

pub async fn manufacturer_list(
    State(state): State<AppState>,
    Query(query): Query<ManufacturerQuery>,
) -> Result<Rendered<impl Serialize>> {
    let term = query.name.unwrap_or_default();
    let pattern = contains_pattern(&term);

    let total = queries::count_manufacturers(&state.pool, &pattern).await?;
    let page_size = state.settings.pagination.page_size;
    let page = PageInfo::resolve(total, query.page.as_deref(), page_size)?;
    let manufacturer_list =
        queries::list_manufacturers(&state.pool, &pattern, page.limit(), page.offset()).await?;

    Ok(Rendered::new(
        "taxi/manufacturer_list.html",
        ListContext {
            manufacturer_list,
            search_form: SearchForm::new("name", &term),
            pagination: page.into(),
        },
    ))
}

pub async fn manufacturer_create_form() -> Rendered<impl Serialize> {
    Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: None,
            form: ManufacturerForm::default(),
            errors: FormErrors::default(),
        },
    )
}

pub async fn manufacturer_create(
    State(state): State<AppState>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Response> {
    let mut errors = validate(&state, &form, None).await?;

    if errors.is_empty() {
        let inserted =
            queries::insert_manufacturer(&state.pool, form.name.trim(), form.country.trim()).await;
        match inserted {
            Ok(id) => {
                info!(manufacturer_id = id, name = %form.name.trim(), "manufacturer created");
                return Ok(found(LIST_URL));
            }
            Err(err) if err.unique_violation() == Some("name") => errors.add("name", NAME_TAKEN),
            Err(err) => return Err(err),
        }
    }

    let context = FormContext {
        object: None,
        form,
        errors,
    };
    Ok(Rendered::new(FORM_TEMPLATE, context).into_response())
}

pub async fn manufacturer_update_form(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let manufacturer = load(&state, id).await?;
    let form = ManufacturerForm {
        name: manufacturer.name.clone(),
        country: manufacturer.country.clone(),
    };
    Ok(Rendered::new(
        FORM_TEMPLATE,
        FormContext {
            object: Some(manufacturer),
            form,
            errors: FormErrors::default(),
        },
    ))
}

pub async fn manufacturer_update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    Form(form): Form<ManufacturerForm>,
) -> Result<Response> {
    let manufacturer = load(&state, id).await?;

    let mut errors = validate(&state, &form, Some(id)).await?;

    if errors.is_empty() {
        let updated =
            queries::update_manufacturer(&state.pool, id, form.name.trim(), form.country.trim())
                .await;
        match updated {
            Ok(true) => {
                info!(manufacturer_id = id, "manufacturer updated");
                return Ok(found(LIST_URL));
            }
            Ok(false) => return Err(AppError::not_found("Manufacturer", id)),
            Err(err) if err.unique_violation() == Some("name") => errors.add("name", NAME_TAKEN),
            Err(err) => return Err(err),
        }
    }

    let context = FormContext {
        object: Some(manufacturer),
        form,
        errors,
    };
    Ok(Rendered::new(FORM_TEMPLATE, context).into_response())
}

pub async fn manufacturer_confirm_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Rendered<impl Serialize>> {
    let manufacturer = load(&state, id).await?;
    Ok(Rendered::new(
        "taxi/manufacturer_confirm_delete.html",
        DeleteContext { manufacturer },
    ))
}

pub async fn manufacturer_delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Response> {
    if !queries::delete_manufacturer(&state.pool, id).await? {
        return Err(AppError::not_found("Manufacturer", id));
    }
    info!(manufacturer_id = id, "manufacturer deleted");
    Ok(found(LIST_URL))
}
