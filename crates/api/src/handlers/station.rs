//! Handlers for the `/stations` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::station::{CreateStation, Station, StationListParams, UpdateStation};
use railway_db::repositories::StationRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Station",
        id,
    })
}

/// GET /api/v1/stations?name=
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<StationListParams>,
) -> AppResult<Json<DataResponse<Vec<Station>>>> {
    let stations = StationRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: stations }))
}

/// POST /api/v1/stations
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateStation>,
) -> AppResult<(StatusCode, Json<DataResponse<Station>>)> {
    let station = StationRepo::create(&state.pool, &input).await?;
    tracing::info!(station_id = station.id, user_id = admin.user_id, "Station created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: station })))
}

/// GET /api/v1/stations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Station>>> {
    let station = StationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: station }))
}

/// PUT /api/v1/stations/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateStation>,
) -> AppResult<Json<DataResponse<Station>>> {
    let station = StationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(station_id = id, user_id = admin.user_id, "Station updated");
    Ok(Json(DataResponse { data: station }))
}

/// DELETE /api/v1/stations/{id}
///
/// Cascades to every route touching the station, and their trips.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !StationRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(station_id = id, user_id = admin.user_id, "Station deleted");
    Ok(StatusCode::NO_CONTENT)
}
