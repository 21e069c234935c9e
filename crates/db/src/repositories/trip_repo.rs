//! Repository for the `trips` and `trip_crews` tables.

use railway_core::booking::TrainCapacity;
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::error::LayoutWriteError;
use crate::models::trip::{CreateTrip, CrewTrip, Trip, TripFilter, TripSummaryRow, UpdateTrip};
use crate::repositories::TicketRepo;

/// Trip row with its crew ids aggregated from `trip_crews`.
const TRIP_SELECT: &str = "SELECT t.id, t.route_id, t.train_id, t.departure_time, t.arrival_time, \
        COALESCE( \
            (SELECT ARRAY_AGG(tc.crew_id ORDER BY tc.crew_id) \
             FROM trip_crews tc WHERE tc.trip_id = t.id), \
            '{}' \
        ) AS crews, \
        t.created_at, t.updated_at \
     FROM trips t";

/// Read-side projection: route and train names, crew names and the booked
/// ticket count, all evaluated at query time.
const SUMMARY_SELECT: &str = "SELECT t.id, t.route_id, \
        s.name || ' - ' || d.name AS route, \
        tr.name AS train, tr.cargo_count, tr.seats_per_cargo, \
        t.departure_time, t.arrival_time, \
        COALESCE( \
            (SELECT ARRAY_AGG(c.first_name || ' ' || c.last_name ORDER BY c.id) \
             FROM trip_crews tc JOIN crews c ON c.id = tc.crew_id \
             WHERE tc.trip_id = t.id), \
            '{}' \
        ) AS crew_names, \
        (SELECT COUNT(*) FROM tickets tk WHERE tk.trip_id = t.id) AS tickets_booked \
     FROM trips t \
     JOIN routes r ON r.id = t.route_id \
     JOIN stations s ON s.id = r.source_id \
     JOIN stations d ON d.id = r.destination_id \
     JOIN trains tr ON tr.id = t.train_id";

/// Provides CRUD operations for trips and their crew assignments.
pub struct TripRepo;

impl TripRepo {
    /// Insert a new trip with its crew set, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrip) -> Result<Trip, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO trips (route_id, train_id, departure_time, arrival_time)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.route)
        .bind(input.train)
        .bind(input.departure_time)
        .bind(input.arrival_time)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_crews_inner(&mut tx, id, &input.crews).await?;

        let query = format!("{TRIP_SELECT} WHERE t.id = $1");
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(trip)
    }

    /// Find a trip row (with crew ids) by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!("{TRIP_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the read-side summary of a trip.
    pub async fn find_summary_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TripSummaryRow>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TripSummaryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List trip summaries, filtered by the UTC calendar date of departure
    /// and/or arrival.
    pub async fn list_summaries(
        pool: &PgPool,
        filter: &TripFilter,
    ) -> Result<Vec<TripSummaryRow>, sqlx::Error> {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.departure_date.is_some() {
            conditions.push(format!(
                "(t.departure_time AT TIME ZONE 'UTC')::date = ${bind_idx}"
            ));
            bind_idx += 1;
        }
        if filter.arrival_date.is_some() {
            conditions.push(format!(
                "(t.arrival_time AT TIME ZONE 'UTC')::date = ${bind_idx}"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("{SUMMARY_SELECT} {where_clause} ORDER BY t.id");
        let mut q = sqlx::query_as::<_, TripSummaryRow>(&query);

        if let Some(date) = filter.departure_date {
            q = q.bind(date);
        }
        if let Some(date) = filter.arrival_date {
            q = q.bind(date);
        }

        q.fetch_all(pool).await
    }

    /// Load summaries for a set of trips, used to embed trips in tickets.
    pub async fn summaries_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<TripSummaryRow>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE t.id = ANY($1) ORDER BY t.id");
        sqlx::query_as::<_, TripSummaryRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List the trips of each given crew member.
    pub async fn list_for_crews(
        pool: &PgPool,
        crew_ids: &[DbId],
    ) -> Result<Vec<CrewTrip>, sqlx::Error> {
        let query = format!(
            "SELECT assigned.crew_id, trip.* FROM trip_crews assigned
             JOIN ({TRIP_SELECT}) trip ON trip.id = assigned.trip_id
             WHERE assigned.crew_id = ANY($1)
             ORDER BY assigned.crew_id, trip.id"
        );
        sqlx::query_as::<_, CrewTrip>(&query)
            .bind(crew_ids)
            .fetch_all(pool)
            .await
    }

    /// Update a trip. Only non-`None` fields in `input` are applied; `crews`
    /// replaces the whole crew set when present.
    ///
    /// The trip row is locked first, so bookings on it finish before the
    /// move is checked. Moving the trip onto a train too small for its booked
    /// tickets is rejected with [`LayoutWriteError::Stranded`].
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrip,
    ) -> Result<Option<Trip>, LayoutWriteError> {
        let mut tx = pool.begin().await?;

        let Some((current_train,)): Option<(DbId,)> =
            sqlx::query_as("SELECT train_id FROM trips WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };

        if let Some(train_id) = input.train.filter(|&train_id| train_id != current_train) {
            let (cargo_count, seats_per_cargo): (i32, i32) = sqlx::query_as(
                "SELECT cargo_count, seats_per_cargo FROM trains WHERE id = $1 FOR SHARE",
            )
            .bind(train_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LayoutWriteError::UnknownTrain(train_id))?;

            let layout = TrainCapacity {
                cargo_count,
                seats_per_cargo,
            };
            TicketRepo::booked_extent_for_trip(&mut tx, id)
                .await?
                .fits(&layout)
                .map_err(|error| LayoutWriteError::Stranded { train_id, error })?;
        }

        sqlx::query(
            "UPDATE trips SET
                route_id = COALESCE($2, route_id),
                train_id = COALESCE($3, train_id),
                departure_time = COALESCE($4, departure_time),
                arrival_time = COALESCE($5, arrival_time)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.route)
        .bind(input.train)
        .bind(input.departure_time)
        .bind(input.arrival_time)
        .execute(&mut *tx)
        .await?;

        if let Some(ref crews) = input.crews {
            Self::set_crews_inner(&mut tx, id, crews).await?;
        }

        let query = format!("{TRIP_SELECT} WHERE t.id = $1");
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(trip))
    }

    /// Delete a trip and, by cascade, its tickets and crew assignments.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the crew set of a trip within an existing transaction.
    async fn set_crews_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        trip_id: DbId,
        crew_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM trip_crews WHERE trip_id = $1")
            .bind(trip_id)
            .execute(&mut **tx)
            .await?;

        for &crew_id in crew_ids {
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
