//! Handlers for the `/train-types` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::train_type::{
    CreateTrainType, TrainType, TrainTypeDetail, TrainTypeListParams, UpdateTrainType,
};
use railway_db::repositories::TrainTypeRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TrainType",
        id,
    })
}

/// GET /api/v1/train-types?name=
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<TrainTypeListParams>,
) -> AppResult<Json<DataResponse<Vec<TrainTypeDetail>>>> {
    let train_types = TrainTypeRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: train_types }))
}

/// POST /api/v1/train-types
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateTrainType>,
) -> AppResult<(StatusCode, Json<DataResponse<TrainType>>)> {
    let train_type = TrainTypeRepo::create(&state.pool, &input).await?;
    tracing::info!(
        train_type_id = train_type.id,
        user_id = admin.user_id,
        "Train type created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: train_type })))
}

/// GET /api/v1/train-types/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TrainTypeDetail>>> {
    let train_type = TrainTypeRepo::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: train_type }))
}

/// PUT /api/v1/train-types/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTrainType>,
) -> AppResult<Json<DataResponse<TrainType>>> {
    let train_type = TrainTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(train_type_id = id, user_id = admin.user_id, "Train type updated");
    Ok(Json(DataResponse { data: train_type }))
}

/// DELETE /api/v1/train-types/{id}
///
/// Cascades to the trains of this type and everything they run.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TrainTypeRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(train_type_id = id, user_id = admin.user_id, "Train type deleted");
    Ok(StatusCode::NO_CONTENT)
}
