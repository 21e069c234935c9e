//! Station entity model and DTOs.

use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A station row from the `stations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Station {
    pub id: DbId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new station.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStation {
    #[validate(length(min = 1, max = 63))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// DTO for updating an existing station. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStation {
    #[validate(length(min = 1, max = 63))]
    pub name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Query filters for `GET /stations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationListParams {
    /// Case-insensitive substring of the station name.
    pub name: Option<String>,
}
