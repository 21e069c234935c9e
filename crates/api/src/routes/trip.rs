//! Route definitions for the `/trips` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::trip;
use crate::state::AppState;

/// Routes mounted at `/trips`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trip::list).post(trip::create))
        .route(
            "/{id}",
            get(trip::get_by_id)
                .put(trip::update)
                .delete(trip::delete),
        )
}
