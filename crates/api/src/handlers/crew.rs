//! Handlers for the `/crews` resource.
//!
//! Every response embeds the trips each crew member is assigned to.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::crew::{CreateCrew, Crew, CrewDetail, CrewListParams, UpdateCrew};
use railway_db::models::trip::Trip;
use railway_db::repositories::{CrewRepo, TripRepo};
use railway_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Crew", id })
}

/// Attach each crew member's trips in a single query.
async fn with_trips(pool: &DbPool, crews: Vec<Crew>) -> AppResult<Vec<CrewDetail>> {
    let ids: Vec<DbId> = crews.iter().map(|c| c.id).collect();

    let mut trips_by_crew: HashMap<DbId, Vec<Trip>> = HashMap::new();
    for assignment in TripRepo::list_for_crews(pool, &ids).await? {
        trips_by_crew
            .entry(assignment.crew_id)
            .or_default()
            .push(assignment.trip);
    }

    Ok(crews
        .into_iter()
        .map(|crew| {
            let trips = trips_by_crew.remove(&crew.id).unwrap_or_default();
            CrewDetail::new(crew, trips)
        })
        .collect())
}

async fn single_detail(pool: &DbPool, crew: Crew) -> AppResult<CrewDetail> {
    let id = crew.id;
    with_trips(pool, vec![crew])
        .await?
        .pop()
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/crews?first_name=
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<CrewListParams>,
) -> AppResult<Json<DataResponse<Vec<CrewDetail>>>> {
    let crews = CrewRepo::list(&state.pool, &params).await?;
    let data = with_trips(&state.pool, crews).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/crews
///
/// Unknown trip ids in `trips` fail the whole insert with 404.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateCrew>,
) -> AppResult<(StatusCode, Json<DataResponse<CrewDetail>>)> {
    let crew = CrewRepo::create(&state.pool, &input).await?;
    tracing::info!(
        crew_id = crew.id,
        trips = input.trips.len(),
        user_id = admin.user_id,
        "Crew member created",
    );
    let data = single_detail(&state.pool, crew).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/crews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CrewDetail>>> {
    let crew = CrewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = single_detail(&state.pool, crew).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/crews/{id}
///
/// When `trips` is present it replaces the whole assignment set.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCrew>,
) -> AppResult<Json<DataResponse<CrewDetail>>> {
    let crew = CrewRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(crew_id = id, user_id = admin.user_id, "Crew member updated");
    let data = single_detail(&state.pool, crew).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/crews/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CrewRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(crew_id = id, user_id = admin.user_id, "Crew member deleted");
    Ok(StatusCode::NO_CONTENT)
}
