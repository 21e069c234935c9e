pub mod auth;
pub mod crew;
pub mod health;
pub mod order;
pub mod route;
pub mod station;
pub mod ticket;
pub mod train;
pub mod train_type;
pub mod trip;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/refresh                  refresh (public)
/// /auth/logout                   logout (requires auth)
/// /auth/me                       current user (requires auth)
///
/// /stations[/{id}]               read: auth, write: admin
/// /train-types[/{id}]            read: auth, write: admin
/// /trains[/{id}]                 read: auth, write: admin
/// /routes[/{id}]                 read: auth, write: admin
/// /crews[/{id}]                  read: auth, write: admin
/// /trips[/{id}]                  read: auth, write: admin
/// /tickets[/{id}]                read: auth, write: admin
///
/// /orders[/{id}]                 own orders only (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/stations", station::router())
        .nest("/train-types", train_type::router())
        .nest("/trains", train::router())
        .nest("/routes", route::router())
        .nest("/crews", crew::router())
        .nest("/trips", trip::router())
        .nest("/tickets", ticket::router())
        .nest("/orders", order::router())
}
