//! Handlers for the `/trains` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::train::{CreateTrain, Train, TrainDetail, TrainListParams, UpdateTrain};
use railway_db::repositories::TrainRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Train",
        id,
    })
}

/// GET /api/v1/trains?train_type=
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<TrainListParams>,
) -> AppResult<Json<DataResponse<Vec<TrainDetail>>>> {
    let trains = TrainRepo::list(&state.pool, &params)
        .await?
        .into_iter()
        .map(TrainDetail::from)
        .collect();
    Ok(Json(DataResponse { data: trains }))
}

/// POST /api/v1/trains
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateTrain>,
) -> AppResult<(StatusCode, Json<DataResponse<Train>>)> {
    let train = TrainRepo::create(&state.pool, &input).await?;
    tracing::info!(
        train_id = train.id,
        cargo_count = train.cargo_count,
        seats_per_cargo = train.seats_per_cargo,
        user_id = admin.user_id,
        "Train created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: train })))
}

/// GET /api/v1/trains/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TrainDetail>>> {
    let train = TrainRepo::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: TrainDetail::from(train),
    }))
}

/// PUT /api/v1/trains/{id}
///
/// A layout change that would leave a booked seat outside the train is
/// rejected with 409.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTrain>,
) -> AppResult<Json<DataResponse<Train>>> {
    let train = TrainRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(train_id = id, user_id = admin.user_id, "Train updated");
    Ok(Json(DataResponse { data: train }))
}

/// DELETE /api/v1/trains/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TrainRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(train_id = id, user_id = admin.user_id, "Train deleted");
    Ok(StatusCode::NO_CONTENT)
}
