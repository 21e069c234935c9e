//! Train entity model and DTOs.

use railway_core::booking::TrainCapacity;
use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A train row from the `trains` table, as returned by writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Train {
    pub id: DbId,
    pub name: String,
    pub cargo_count: i32,
    pub seats_per_cargo: i32,
    #[serde(rename = "train_type")]
    pub train_type_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Train {
    pub fn layout(&self) -> TrainCapacity {
        TrainCapacity {
            cargo_count: self.cargo_count,
            seats_per_cargo: self.seats_per_cargo,
        }
    }
}

/// Train joined with its type name, as loaded from the database.
#[derive(Debug, Clone, FromRow)]
pub struct TrainDetailRow {
    pub id: DbId,
    pub name: String,
    pub cargo_count: i32,
    pub seats_per_cargo: i32,
    pub train_type: String,
}

/// Read-side train: type name instead of id, plus total seat capacity.
#[derive(Debug, Clone, Serialize)]
pub struct TrainDetail {
    pub id: DbId,
    pub name: String,
    pub cargo_count: i32,
    pub seats_per_cargo: i32,
    pub train_type: String,
    pub capacity: i64,
}

impl From<TrainDetailRow> for TrainDetail {
    fn from(row: TrainDetailRow) -> Self {
        let capacity = TrainCapacity {
            cargo_count: row.cargo_count,
            seats_per_cargo: row.seats_per_cargo,
        }
        .total_seats();
        Self {
            id: row.id,
            name: row.name,
            cargo_count: row.cargo_count,
            seats_per_cargo: row.seats_per_cargo,
            train_type: row.train_type,
            capacity,
        }
    }
}

/// DTO for creating a new train.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTrain {
    #[validate(length(min = 1, max = 63))]
    pub name: String,
    #[validate(range(min = 1))]
    pub cargo_count: i32,
    #[validate(range(min = 1))]
    pub seats_per_cargo: i32,
    pub train_type: DbId,
}

/// DTO for updating an existing train. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTrain {
    #[validate(length(min = 1, max = 63))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub cargo_count: Option<i32>,
    #[validate(range(min = 1))]
    pub seats_per_cargo: Option<i32>,
    pub train_type: Option<DbId>,
}

/// Query filters for `GET /trains`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainListParams {
    /// Case-insensitive substring of the train type name.
    pub train_type: Option<String>,
}
