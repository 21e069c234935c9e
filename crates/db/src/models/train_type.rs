//! Train type entity model and DTOs.

use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A train type row from the `train_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainType {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Read-side train type with the ids of trains of that type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainTypeDetail {
    pub id: DbId,
    pub name: String,
    pub trains: Vec<DbId>,
}

/// DTO for creating or renaming a train type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrainType {
    #[validate(length(min = 1, max = 63))]
    pub name: String,
}

/// DTO for updating an existing train type. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTrainType {
    #[validate(length(min = 1, max = 63))]
    pub name: Option<String>,
}

/// Query filters for `GET /train-types`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainTypeListParams {
    pub name: Option<String>,
}
