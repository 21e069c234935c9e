//! Crew entity model and DTOs.

use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::trip::Trip;

/// A crew member row from the `crews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Crew {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read-side crew member with the trips they are assigned to.
#[derive(Debug, Clone, Serialize)]
pub struct CrewDetail {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub trips: Vec<Trip>,
}

impl CrewDetail {
    pub fn new(crew: Crew, trips: Vec<Trip>) -> Self {
        let full_name = crew.full_name();
        Self {
            id: crew.id,
            first_name: crew.first_name,
            last_name: crew.last_name,
            full_name,
            trips,
        }
    }
}

/// DTO for creating a crew member, optionally assigning trips.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCrew {
    #[validate(length(min = 1, max = 63))]
    pub first_name: String,
    #[validate(length(min = 1, max = 63))]
    pub last_name: String,
    #[serde(default)]
    pub trips: Vec<DbId>,
}

/// DTO for updating a crew member. `trips`, when present, replaces the set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCrew {
    #[validate(length(min = 1, max = 63))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 63))]
    pub last_name: Option<String>,
    pub trips: Option<Vec<DbId>>,
}

/// Query filters for `GET /crews`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewListParams {
    pub first_name: Option<String>,
}
