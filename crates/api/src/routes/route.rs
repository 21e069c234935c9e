//! Route definitions for the `/routes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::route;
use crate::state::AppState;

/// Routes mounted at `/routes`.
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
        .route("/", get(route::list).post(route::create))
        .route(
            "/{id}",
            get(route::get_by_id)
                .put(route::update)
                .delete(route::delete),
        )
}
