//! Handlers for the `/tickets` resource.
//!
//! Passengers book through `/orders`; these endpoints let an admin inspect
//! and correct individual tickets. Every write re-runs the seat placement
//! rules against the trip's train.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::ticket::{
    CreateTicket, Ticket, TicketDetail, TicketListParams, UpdateTicket,
};
use railway_db::repositories::TicketRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Ticket",
        id,
    })
}

/// GET /api/v1/tickets?trips=1,3
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(params): Query<TicketListParams>,
) -> AppResult<Json<DataResponse<Vec<TicketDetail>>>> {
    let trip_ids = params.trip_ids()?;
    let tickets = TicketRepo::list(&state.pool, trip_ids.as_deref()).await?;
    let data = TicketRepo::with_trips(&state.pool, tickets).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/tickets
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateTicket>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    let ticket = TicketRepo::create(&state.pool, &input).await?;
    tracing::info!(
        ticket_id = ticket.id,
        trip_id = ticket.trip_id,
        order_id = ticket.order_id,
        cargo = ticket.cargo,
        seat = ticket.seat,
        user_id = admin.user_id,
        "Ticket created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketDetail>>> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = TicketRepo::with_trips(&state.pool, vec![ticket])
        .await?
        .pop()
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/tickets/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTicket>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        ticket_id = id,
        trip_id = ticket.trip_id,
        cargo = ticket.cargo,
        seat = ticket.seat,
        user_id = admin.user_id,
        "Ticket updated",
    );
    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/tickets/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TicketRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(ticket_id = id, user_id = admin.user_id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}
