//! Repository for the `crews` table.

use railway_core::filters::contains_pattern;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::models::crew::{CreateCrew, Crew, CrewListParams, UpdateCrew};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, created_at, updated_at";

/// Provides CRUD operations for crew members.
pub struct CrewRepo;

impl CrewRepo {
    /// Insert a crew member and assign them to `input.trips`.
    pub async fn create(pool: &PgPool, input: &CreateCrew) -> Result<Crew, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO crews (first_name, last_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let crew = sqlx::query_as::<_, Crew>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_trips_inner(&mut tx, crew.id, &input.trips).await?;

        tx.commit().await?;
        Ok(crew)
    }

    /// Find a crew member by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Crew>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM crews WHERE id = $1");
        sqlx::query_as::<_, Crew>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List crew members ordered by ID, optionally filtered by first name substring.
    pub async fn list(pool: &PgPool, params: &CrewListParams) -> Result<Vec<Crew>, sqlx::Error> {
        let first_name = params.first_name.as_deref().map(contains_pattern);
        let query = format!(
            "SELECT {COLUMNS} FROM crews
             WHERE ($1::text IS NULL OR first_name ILIKE $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, Crew>(&query)
            .bind(first_name)
            .fetch_all(pool)
            .await
    }

    /// Update a crew member. `trips`, when present, replaces the trip set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCrew,
    ) -> Result<Option<Crew>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE crews SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(crew) = sqlx::query_as::<_, Crew>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(ref trips) = input.trips {
            Self::set_trips_inner(&mut tx, id, trips).await?;
        }

        tx.commit().await?;
        Ok(Some(crew))
    }

    /// Delete a crew member. Trip assignments go with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the trip set of a crew member within an existing transaction.
    async fn set_trips_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        crew_id: DbId,
        trip_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM trip_crews WHERE crew_id = $1")
            .bind(crew_id)
            .execute(&mut **tx)
            .await?;

        for &trip_id in trip_ids {
            sqlx::query(
                "INSERT INTO trip_crews (trip_id, crew_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(trip_id)
            .bind(crew_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
