//! Order entity model and DTOs.

use railway_core::booking::SeatRequest;
use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::ticket::{Ticket, TicketDetail, TicketInput};

/// An order row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    #[serde(skip)]
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order as returned right after placement: the raw ticket rows.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub id: DbId,
    pub created_at: Timestamp,
    pub tickets: Vec<Ticket>,
}

/// Read-side order with tickets and their trips embedded.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub id: DbId,
    pub created_at: Timestamp,
    pub tickets: Vec<TicketDetail>,
}

/// DTO for placing an order.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrder {
    pub tickets: Vec<TicketInput>,
}

impl CreateOrder {
    pub fn seat_requests(&self) -> Vec<SeatRequest> {
        self.tickets.iter().map(SeatRequest::from).collect()
    }
}
