//! Repository for the `stations` table.

use railway_core::filters::contains_pattern;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::models::station::{CreateStation, Station, StationListParams, UpdateStation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, latitude, longitude, created_at, updated_at";

/// Provides CRUD operations for stations.
pub struct StationRepo;

impl StationRepo {
    /// Insert a new station, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateStation) -> Result<Station, sqlx::Error> {
        let query = format!(
            "INSERT INTO stations (name, latitude, longitude)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// Find a station by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Station>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stations WHERE id = $1");
        sqlx::query_as::<_, Station>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List stations ordered by ID, optionally filtered by name substring.
    pub async fn list(
        pool: &PgPool,
        params: &StationListParams,
    ) -> Result<Vec<Station>, sqlx::Error> {
        let name = params.name.as_deref().map(contains_pattern);
        let query = format!(
            "SELECT {COLUMNS} FROM stations
             WHERE ($1::text IS NULL OR name ILIKE $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(name)
            .fetch_all(pool)
            .await
    }

    /// Update a station. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStation,
    ) -> Result<Option<Station>, sqlx::Error> {
        let query = format!(
            "UPDATE stations SET
                name = COALESCE($2, name),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_optional(pool)
            .await
    }

    /// Delete a station and, by cascade, its routes, trips and tickets.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
