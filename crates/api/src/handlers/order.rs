//! Handlers for the `/orders` resource.
//!
//! Orders are always scoped to the caller: another user's order is
//! indistinguishable from a missing one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use railway_core::error::CoreError;
use railway_core::types::DbId;
use railway_db::models::order::{CreateOrder, OrderDetail, PlacedOrder};
use railway_db::repositories::OrderRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Order",
        id,
    })
}

/// GET /api/v1/orders
///
/// The caller's orders, newest first, each with its tickets and their trips.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<OrderDetail>>>> {
    let orders = OrderRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    let data = OrderRepo::with_tickets(&state.pool, orders).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/orders
///
/// Book every ticket in the body or none of them. A rejected ticket is
/// reported with its index in `details.ticket_index`.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> AppResult<(StatusCode, Json<DataResponse<PlacedOrder>>)> {
    let requests = input.seat_requests();

    let order = OrderRepo::place(&state.pool, auth_user.user_id, &requests)
        .await
        .inspect_err(|err| {
            tracing::debug!(user_id = auth_user.user_id, error = %err, "Order rejected");
        })?;

    tracing::info!(
        order_id = order.id,
        user_id = auth_user.user_id,
        tickets = order.tickets.len(),
        "Order placed",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// GET /api/v1/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = OrderRepo::find_for_user(&state.pool, id, auth_user.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let data = OrderRepo::with_tickets(&state.pool, vec![order])
        .await?
        .pop()
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/orders/{id}
///
/// Cancels the order and releases its seats.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !OrderRepo::delete_for_user(&state.pool, id, auth_user.user_id).await? {
        return Err(not_found(id));
    }
    tracing::info!(order_id = id, user_id = auth_user.user_id, "Order cancelled");
    Ok(StatusCode::NO_CONTENT)
}
