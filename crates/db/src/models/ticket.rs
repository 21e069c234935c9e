//! Ticket entity model and DTOs.

use railway_core::booking::{validate_placement, BookingError, SeatRequest, TrainCapacity};
use railway_core::error::CoreError;
use railway_core::filters::parse_id_list;
use railway_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::trip::TripSummary;

/// A ticket row from the `tickets` table, as returned by writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub cargo: i32,
    pub seat: i32,
    #[serde(rename = "trip")]
    pub trip_id: DbId,
    #[serde(rename = "order")]
    pub order_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Highest cargo and seat indices booked on a trip or train.
///
/// Both are `None` when nothing is booked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct BookedExtent {
    pub max_cargo: Option<i32>,
    pub max_seat: Option<i32>,
}

impl BookedExtent {
    /// Check that every booked seat still exists under `layout`.
    pub fn fits(&self, layout: &TrainCapacity) -> Result<(), BookingError> {
        match (self.max_cargo, self.max_seat) {
            (Some(cargo), Some(seat)) => validate_placement(cargo, seat, layout),
            _ => Ok(()),
        }
    }
}

/// Read-side ticket with its trip embedded.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub id: DbId,
    pub cargo: i32,
    pub seat: i32,
    pub order: DbId,
    pub trip: TripSummary,
}

/// One ticket inside an order creation request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TicketInput {
    pub cargo: i32,
    pub seat: i32,
    pub trip: DbId,
}

impl From<&TicketInput> for SeatRequest {
    fn from(input: &TicketInput) -> Self {
        SeatRequest {
            trip_id: input.trip,
            cargo: input.cargo,
            seat: input.seat,
        }
    }
}

/// DTO for placing a ticket into an existing order (admin only).
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CreateTicket {
    pub cargo: i32,
    pub seat: i32,
    pub trip: DbId,
    pub order: DbId,
}

/// DTO for moving a ticket. All fields are optional.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct UpdateTicket {
    pub cargo: Option<i32>,
    pub seat: Option<i32>,
    pub trip: Option<DbId>,
}

/// Raw query string of `GET /tickets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListParams {
    /// Comma-separated trip ids, e.g. `1,3`.
    pub trips: Option<String>,
}

impl TicketListParams {
    /// Trip ids to restrict to, or `None` for all trips.
    pub fn trip_ids(&self) -> Result<Option<Vec<DbId>>, CoreError> {
        match self.trips.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_id_list(raw, "trips").map(Some),
            _ => Ok(None),
        }
    }
}
