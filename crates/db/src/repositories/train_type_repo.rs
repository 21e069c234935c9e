//! Repository for the `train_types` table.

use railway_core::filters::contains_pattern;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::models::train_type::{
    CreateTrainType, TrainType, TrainTypeDetail, TrainTypeListParams, UpdateTrainType,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Read-side projection with the ids of trains of each type.
const DETAIL_SELECT: &str = "SELECT tt.id, tt.name, \
        COALESCE( \
            (SELECT ARRAY_AGG(t.id ORDER BY t.id) FROM trains t WHERE t.train_type_id = tt.id), \
            '{}' \
        ) AS trains \
     FROM train_types tt";

/// Provides CRUD operations for train types.
pub struct TrainTypeRepo;

impl TrainTypeRepo {
    /// Insert a new train type, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrainType) -> Result<TrainType, sqlx::Error> {
        let query = format!("INSERT INTO train_types (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, TrainType>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a train type by ID together with its train ids.
    pub async fn find_detail_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrainTypeDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE tt.id = $1");
        sqlx::query_as::<_, TrainTypeDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List train types, optionally filtered by name substring.
    pub async fn list(
        pool: &PgPool,
        params: &TrainTypeListParams,
    ) -> Result<Vec<TrainTypeDetail>, sqlx::Error> {
        let name = params.name.as_deref().map(contains_pattern);
        let query = format!(
            "{DETAIL_SELECT}
             WHERE ($1::text IS NULL OR tt.name ILIKE $1)
             ORDER BY tt.id"
        );
        sqlx::query_as::<_, TrainTypeDetail>(&query)
            .bind(name)
            .fetch_all(pool)
            .await
    }

    /// Update a train type. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrainType,
    ) -> Result<Option<TrainType>, sqlx::Error> {
        let query = format!(
            "UPDATE train_types SET name = COALESCE($2, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrainType>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a train type and, by cascade, its trains, trips and tickets.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM train_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
