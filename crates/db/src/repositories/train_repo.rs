//! Repository for the `trains` table.

use std::collections::HashMap;

use railway_core::booking::TrainCapacity;
use railway_core::filters::contains_pattern;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::error::LayoutWriteError;
use crate::models::train::{CreateTrain, Train, TrainDetailRow, TrainListParams, UpdateTrain};
use crate::repositories::TicketRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, cargo_count, seats_per_cargo, train_type_id, created_at, updated_at";

/// Read-side projection joining the train type name.
const DETAIL_SELECT: &str = "SELECT t.id, t.name, t.cargo_count, t.seats_per_cargo, \
        tt.name AS train_type \
     FROM trains t \
     JOIN train_types tt ON tt.id = t.train_type_id";

/// Provides CRUD operations for trains and capacity lookups for booking.
pub struct TrainRepo;

impl TrainRepo {
    /// Insert a new train, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrain) -> Result<Train, sqlx::Error> {
        let query = format!(
            "INSERT INTO trains (name, cargo_count, seats_per_cargo, train_type_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Train>(&query)
            .bind(&input.name)
            .bind(input.cargo_count)
            .bind(input.seats_per_cargo)
            .bind(input.train_type)
            .fetch_one(pool)
            .await
    }

    /// Find a train row by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Train>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trains WHERE id = $1");
        sqlx::query_as::<_, Train>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a train by ID with its type name resolved.
    pub async fn find_detail_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrainDetailRow>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TrainDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List trains with type names, optionally filtered by type name substring.
    pub async fn list(
        pool: &PgPool,
        params: &TrainListParams,
    ) -> Result<Vec<TrainDetailRow>, sqlx::Error> {
        let train_type = params.train_type.as_deref().map(contains_pattern);
        let query = format!(
            "{DETAIL_SELECT}
             WHERE ($1::text IS NULL OR tt.name ILIKE $1)
             ORDER BY t.id"
        );
        sqlx::query_as::<_, TrainDetailRow>(&query)
            .bind(train_type)
            .fetch_all(pool)
            .await
    }

    /// Update a train. Only non-`None` fields in `input` are applied.
    ///
    /// The train row is locked before the layout is checked, so bookings
    /// still holding it finish first and their tickets are counted. A layout
    /// that would leave a booked seat outside the train is rejected with
    /// [`LayoutWriteError::Stranded`].
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrain,
    ) -> Result<Option<Train>, LayoutWriteError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM trains WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Train>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let layout = TrainCapacity {
            cargo_count: input.cargo_count.unwrap_or(current.cargo_count),
            seats_per_cargo: input.seats_per_cargo.unwrap_or(current.seats_per_cargo),
        };
        if layout != current.layout() {
            TicketRepo::booked_extent_for_train(&mut tx, id)
                .await?
                .fits(&layout)
                .map_err(|error| LayoutWriteError::Stranded {
                    train_id: id,
                    error,
                })?;
        }

        let query = format!(
            "UPDATE trains SET
                name = COALESCE($2, name),
                cargo_count = $3,
                seats_per_cargo = $4,
                train_type_id = COALESCE($5, train_type_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let train = sqlx::query_as::<_, Train>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(layout.cargo_count)
            .bind(layout.seats_per_cargo)
            .bind(input.train_type)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(train))
    }

    /// Delete a train and, by cascade, its trips and tickets.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trains WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve trip ids to the layout of the train running each trip.
    ///
    /// Trips that do not exist are absent from the map. Both the trip and
    /// train rows stay share-locked until the transaction ends, so a layout
    /// change (see [`TrainRepo::update`], [`TripRepo::update`]) waits for the
    /// booking and then sees its tickets.
    ///
    /// [`TripRepo::update`]: crate::repositories::TripRepo::update
    pub async fn capacities_for_trips(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        trip_ids: &[DbId],
    ) -> Result<HashMap<DbId, TrainCapacity>, sqlx::Error> {
        let rows: Vec<(DbId, i32, i32)> = sqlx::query_as(
            "SELECT tp.id, tr.cargo_count, tr.seats_per_cargo
             FROM trips tp
             JOIN trains tr ON tr.id = tp.train_id
             WHERE tp.id = ANY($1)
             FOR SHARE OF tp, tr",
        )
        .bind(trip_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(trip_id, cargo_count, seats_per_cargo)| {
                (
                    trip_id,
                    TrainCapacity {
                        cargo_count,
                        seats_per_cargo,
                    },
                )
            })
            .collect())
    }
}
