//! Handlers for the `/routes` resource.
//!
//! Reads return station names; writes take and return station ids.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::route::{CreateRoute, Route, RouteDetail, RouteListParams, UpdateRoute};
use railway_db::repositories::RouteRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Route",
        id,
    })
}

/// GET /api/v1/routes?source=&destination=
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<RouteListParams>,
) -> AppResult<Json<DataResponse<Vec<RouteDetail>>>> {
    let routes = RouteRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: routes }))
}

/// POST /api/v1/routes
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateRoute>,
) -> AppResult<(StatusCode, Json<DataResponse<Route>>)> {
    let route = RouteRepo::create(&state.pool, &input).await?;
    tracing::info!(
        route_id = route.id,
        source_id = route.source_id,
        destination_id = route.destination_id,
        user_id = admin.user_id,
        "Route created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: route })))
}

/// GET /api/v1/routes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RouteDetail>>> {
    let route = RouteRepo::find_detail_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: route }))
}

/// PUT /api/v1/routes/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRoute>,
) -> AppResult<Json<DataResponse<Route>>> {
    let route = RouteRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(route_id = id, user_id = admin.user_id, "Route updated");
    Ok(Json(DataResponse { data: route }))
}

/// DELETE /api/v1/routes/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RouteRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(route_id = id, user_id = admin.user_id, "Route deleted");
    Ok(StatusCode::NO_CONTENT)
}
