//! Repository for the `tickets` table.

use std::collections::HashMap;

use railway_core::booking::{validate_placement, BookingError, SeatRequest};
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::error::{is_seat_conflict, TicketWriteError};
use crate::models::ticket::{BookedExtent, CreateTicket, Ticket, TicketDetail, UpdateTicket};
use crate::models::trip::TripSummary;
use crate::repositories::{TrainRepo, TripRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cargo, seat, trip_id, order_id, created_at, updated_at";

/// Provides CRUD operations for tickets.
///
/// Every write re-checks the seat against the train layout and relies on
/// `uq_tickets_trip_cargo_seat` for uniqueness.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a ticket unless its seat is already taken.
    ///
    /// Returns `None` when another ticket (committed, or committed by a
    /// concurrent transaction we waited on) holds the same seat.
    pub async fn insert_if_free(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: DbId,
        request: &SeatRequest,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (cargo, seat, trip_id, order_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (trip_id, cargo, seat) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(request.cargo)
            .bind(request.seat)
            .bind(request.trip_id)
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Place a single ticket into an existing order.
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, TicketWriteError> {
        let request = SeatRequest {
            trip_id: input.trip,
            cargo: input.cargo,
            seat: input.seat,
        };

        let mut tx = pool.begin().await?;

        let capacities = TrainRepo::capacities_for_trips(&mut tx, &[request.trip_id]).await?;
        let layout = capacities
            .get(&request.trip_id)
            .ok_or(BookingError::UnknownTrip {
                trip_id: request.trip_id,
            })?;
        validate_placement(request.cargo, request.seat, layout)?;

        let ticket = Self::insert_if_free(&mut tx, input.order, &request)
            .await?
            .ok_or(BookingError::DuplicateSeat {
                trip_id: request.trip_id,
                cargo: request.cargo,
                seat: request.seat,
            })?;

        tx.commit().await?;
        Ok(ticket)
    }

    /// Find a ticket by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets ordered by cargo and seat, optionally restricted to trips.
    pub async fn list(
        pool: &PgPool,
        trip_ids: Option<&[DbId]>,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE ($1::bigint[] IS NULL OR trip_id = ANY($1))
             ORDER BY cargo, seat, id"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(trip_ids)
            .fetch_all(pool)
            .await
    }

    /// List the tickets of the given orders ordered by cargo and seat.
    pub async fn list_for_orders(
        pool: &PgPool,
        order_ids: &[DbId],
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE order_id = ANY($1)
             ORDER BY cargo, seat, id"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(order_ids)
            .fetch_all(pool)
            .await
    }

    /// Move a ticket to another seat and/or trip.
    ///
    /// Returns `Ok(None)` if no ticket with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, TicketWriteError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let request = SeatRequest {
            trip_id: input.trip.unwrap_or(current.trip_id),
            cargo: input.cargo.unwrap_or(current.cargo),
            seat: input.seat.unwrap_or(current.seat),
        };

        let capacities = TrainRepo::capacities_for_trips(&mut tx, &[request.trip_id]).await?;
        let layout = capacities
            .get(&request.trip_id)
            .ok_or(BookingError::UnknownTrip {
                trip_id: request.trip_id,
            })?;
        validate_placement(request.cargo, request.seat, layout)?;

        let query = format!(
            "UPDATE tickets SET cargo = $2, seat = $3, trip_id = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(request.cargo)
            .bind(request.seat)
            .bind(request.trip_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| {
                if is_seat_conflict(&err) {
                    TicketWriteError::from(BookingError::DuplicateSeat {
                        trip_id: request.trip_id,
                        cargo: request.cargo,
                        seat: request.seat,
                    })
                } else {
                    TicketWriteError::Database(err)
                }
            })?;

        tx.commit().await?;
        Ok(Some(ticket))
    }

    /// Delete a ticket, freeing its seat. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Highest booked cargo and seat over all trips run by a train.
    pub async fn booked_extent_for_train(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        train_id: DbId,
    ) -> Result<BookedExtent, sqlx::Error> {
        sqlx::query_as::<_, BookedExtent>(
            "SELECT MAX(tk.cargo) AS max_cargo, MAX(tk.seat) AS max_seat
             FROM tickets tk
             JOIN trips t ON t.id = tk.trip_id
             WHERE t.train_id = $1",
        )
        .bind(train_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Highest booked cargo and seat on a single trip.
    pub async fn booked_extent_for_trip(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        trip_id: DbId,
    ) -> Result<BookedExtent, sqlx::Error> {
        sqlx::query_as::<_, BookedExtent>(
            "SELECT MAX(cargo) AS max_cargo, MAX(seat) AS max_seat
             FROM tickets
             WHERE trip_id = $1",
        )
        .bind(trip_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Embed trip summaries into tickets, preserving ticket order.
    ///
    /// Tickets whose trip vanished between the two queries are dropped.
    pub async fn with_trips(
        pool: &PgPool,
        tickets: Vec<Ticket>,
    ) -> Result<Vec<TicketDetail>, sqlx::Error> {
        let mut trip_ids: Vec<DbId> = tickets.iter().map(|t| t.trip_id).collect();
        trip_ids.sort_unstable();
        trip_ids.dedup();

        let trips: HashMap<DbId, TripSummary> = TripRepo::summaries_by_ids(pool, &trip_ids)
            .await?
            .into_iter()
            .map(|row| (row.id, TripSummary::from(row)))
            .collect();

        Ok(tickets
            .into_iter()
            .filter_map(|ticket| {
                let trip = trips.get(&ticket.trip_id)?.clone();
                Some(TicketDetail {
                    id: ticket.id,
                    cargo: ticket.cargo,
                    seat: ticket.seat,
                    order: ticket.order_id,
                    trip,
                })
            })
            .collect())
    }
}
