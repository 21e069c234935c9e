//! Repository for the `orders` table and order placement.

use std::collections::HashMap;

use railway_core::booking::{validate_batch, BookingError, SeatRequest, TicketRejection};
use railway_core::types::DbId;
use sqlx::PgPool;

use crate::error::TicketWriteError;
use crate::models::order::{Order, OrderDetail, PlacedOrder};
use crate::models::ticket::TicketDetail;
use crate::repositories::{TicketRepo, TrainRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, created_at, updated_at";

/// Provides placement and owner-scoped reads for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Create an order together with all of its tickets.
    ///
    /// Either every ticket is stored or nothing is: the layouts are loaded
    /// and each ticket validated before the first write, then each seat is
    /// claimed in request order. A seat already held by another order aborts
    /// the whole transaction with `DuplicateSeat` at that ticket's index.
    pub async fn place(
        pool: &PgPool,
        user_id: DbId,
        requests: &[SeatRequest],
    ) -> Result<PlacedOrder, TicketWriteError> {
        let mut trip_ids: Vec<DbId> = requests.iter().map(|r| r.trip_id).collect();
        trip_ids.sort_unstable();
        trip_ids.dedup();

        let mut tx = pool.begin().await?;

        let capacities = TrainRepo::capacities_for_trips(&mut tx, &trip_ids).await?;
        validate_batch(requests, |trip_id| capacities.get(&trip_id).copied())?;

        let query = format!("INSERT INTO orders (user_id) VALUES ($1) RETURNING {COLUMNS}");
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let mut tickets = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let Some(ticket) = TicketRepo::insert_if_free(&mut tx, order.id, request).await?
            else {
                tracing::debug!(
                    trip_id = request.trip_id,
                    cargo = request.cargo,
                    seat = request.seat,
                    "Seat already taken, rolling back order",
                );
                return Err(TicketRejection::at(
                    index,
                    BookingError::DuplicateSeat {
                        trip_id: request.trip_id,
                        cargo: request.cargo,
                        seat: request.seat,
                    },
                )
                .into());
            };
            tickets.push(ticket);
        }

        tx.commit().await?;

        Ok(PlacedOrder {
            id: order.id,
            created_at: order.created_at,
            tickets,
        })
    }

    /// List a user's orders, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find an order owned by `user_id`. Orders of other users are reported
    /// as absent.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Cancel an order owned by `user_id`, releasing its seats.
    /// Returns `true` if a row was removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Embed tickets (and their trips) into orders, keeping the input ordering.
    pub async fn with_tickets(
        pool: &PgPool,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderDetail>, sqlx::Error> {
        let order_ids: Vec<DbId> = orders.iter().map(|o| o.id).collect();
        let tickets = TicketRepo::list_for_orders(pool, &order_ids).await?;
        let details = TicketRepo::with_trips(pool, tickets).await?;

        let mut by_order: HashMap<DbId, Vec<TicketDetail>> = HashMap::new();
        for detail in details {
            by_order.entry(detail.order).or_default().push(detail);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderDetail {
                id: order.id,
                created_at: order.created_at,
                tickets: by_order.remove(&order.id).unwrap_or_default(),
            })
            .collect())
    }
}
