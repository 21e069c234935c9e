//! Route entity model and DTOs.

use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A route row from the `routes` table, as returned by writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Route {
    pub id: DbId,
    #[serde(rename = "source")]
    pub source_id: DbId,
    #[serde(rename = "destination")]
    pub destination_id: DbId,
    pub distance: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Read-side route with station names in place of ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RouteDetail {
    pub id: DbId,
    pub source: String,
    pub destination: String,
    pub distance: i32,
}

/// DTO for creating a new route. Station fields are ids.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoute {
    pub source: DbId,
    pub destination: DbId,
    #[validate(range(min = 0))]
    pub distance: i32,
}

/// DTO for updating an existing route. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoute {
    pub source: Option<DbId>,
    pub destination: Option<DbId>,
    #[validate(range(min = 0))]
    pub distance: Option<i32>,
}

/// Query filters for `GET /routes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteListParams {
    /// Case-insensitive substring of the source station name.
    pub source: Option<String>,
    /// Case-insensitive substring of the destination station name.
    pub destination: Option<String>,
}
