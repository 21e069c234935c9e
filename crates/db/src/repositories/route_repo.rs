//! Repository for the `routes` table.

use railway_core::filters::contains_pattern;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::models::route::{CreateRoute, Route, RouteDetail, RouteListParams, UpdateRoute};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source_id, destination_id, distance, created_at, updated_at";

/// Read-side projection joining both stations.
const DETAIL_SELECT: &str = "SELECT r.id, s.name AS source, d.name AS destination, r.distance \
     FROM routes r \
     JOIN stations s ON s.id = r.source_id \
     JOIN stations d ON d.id = r.destination_id";

/// Provides CRUD operations for routes.
pub struct RouteRepo;

impl RouteRepo {
    /// Insert a new route, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRoute) -> Result<Route, sqlx::Error> {
        let query = format!(
            "INSERT INTO routes (source_id, destination_id, distance)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(input.source)
            .bind(input.destination)
            .bind(input.distance)
            .fetch_one(pool)
            .await
    }

    /// Find a route by ID with station names resolved.
    pub async fn find_detail_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RouteDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, RouteDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List routes with station names, filtered by source and destination
    /// name substrings.
    pub async fn list(
        pool: &PgPool,
        params: &RouteListParams,
    ) -> Result<Vec<RouteDetail>, sqlx::Error> {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if params.source.is_some() {
            conditions.push(format!("s.name ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if params.destination.is_some() {
            conditions.push(format!("d.name ILIKE ${bind_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("{DETAIL_SELECT} {where_clause} ORDER BY r.id");
        let mut q = sqlx::query_as::<_, RouteDetail>(&query);

        if let Some(ref source) = params.source {
            q = q.bind(contains_pattern(source));
        }
        if let Some(ref destination) = params.destination {
            q = q.bind(contains_pattern(destination));
        }

        q.fetch_all(pool).await
    }

    /// Update a route. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoute,
    ) -> Result<Option<Route>, sqlx::Error> {
        let query = format!(
            "UPDATE routes SET
                source_id = COALESCE($2, source_id),
                destination_id = COALESCE($3, destination_id),
                distance = COALESCE($4, distance)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(id)
            .bind(input.source)
            .bind(input.destination)
            .bind(input.distance)
            .fetch_optional(pool)
            .await
    }

    /// Delete a route and, by cascade, its trips and tickets.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
