//! Handlers for the `/trips` resource.
//!
//! Reads return [`TripSummary`] with the live `tickets_available` count;
//! writes take and return raw ids.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::trip::{
    CreateTrip, Trip, TripFilter, TripListParams, TripSummary, UpdateTrip,
};
use railway_db::repositories::TripRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Trip", id })
}

/// GET /api/v1/trips?departure_time=YYYY-MM-DD&arrival_time=YYYY-MM-DD
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<TripListParams>,
) -> AppResult<Json<DataResponse<Vec<TripSummary>>>> {
    let filter = TripFilter::try_from(&params)?;
    let trips = TripRepo::list_summaries(&state.pool, &filter)
        .await?
        .into_iter()
        .map(TripSummary::from)
        .collect();
    Ok(Json(DataResponse { data: trips }))
}

/// POST /api/v1/trips
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateTrip>,
) -> AppResult<(StatusCode, Json<DataResponse<Trip>>)> {
    let trip = TripRepo::create(&state.pool, &input).await?;
    tracing::info!(
        trip_id = trip.id,
        route_id = trip.route_id,
        train_id = trip.train_id,
        user_id = admin.user_id,
        "Trip created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: trip })))
}

/// GET /api/v1/trips/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TripSummary>>> {
    let trip = TripRepo::find_summary_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: TripSummary::from(trip),
    }))
}

/// PUT /api/v1/trips/{id}
///
/// Switching to a train too small for the tickets already booked on this
/// trip is rejected with 409.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTrip>,
) -> AppResult<Json<DataResponse<Trip>>> {
    let trip = TripRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        trip_id = id,
        train_id = trip.train_id,
        user_id = admin.user_id,
        "Trip updated",
    );
    Ok(Json(DataResponse { data: trip }))
}

/// DELETE /api/v1/trips/{id}
///
/// Removes the trip's tickets and crew assignments with it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TripRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(trip_id = id, user_id = admin.user_id, "Trip deleted");
    Ok(StatusCode::NO_CONTENT)
}
