use axum::extract::State;
use serde::Serialize;

use crate::api::Rendered;
use crate::auth::CurrentSession;
use crate::database::queries;
use crate::errors::Result;
use crate::AppState;

#[derive(Serialize)]
struct IndexContext {
    num_drivers: i64,
    num_cars: i64,
    num_manufacturers: i64,
    /// Home page visits within the current session, this one included
    num_visits: i64,
}

pub async fn index(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Rendered<impl Serialize>> {
    let counts = queries::fleet_counts(&state.pool).await?;
    let num_visits = queries::increment_visits(&state.pool, &session.token).await?;

    Ok(Rendered::new(
        "taxi/index.html",
        IndexContext {
            num_drivers: counts.drivers,
            num_cars: counts.cars,
            num_manufacturers: counts.manufacturers,
            num_visits,
        },
    ))
}
