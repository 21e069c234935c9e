//! Errors for writes that must honour the seat placement rules.

use railway_core::booking::{BookingError, TicketRejection};
use railway_core::types::DbId;

/// Name of the unique constraint guarding `(trip_id, cargo, seat)`.
pub const TICKET_SEAT_CONSTRAINT: &str = "uq_tickets_trip_cargo_seat";

/// Failure of a ticket-writing operation.
///
/// Either the request broke a booking rule, or the database failed. The
/// surrounding transaction is always rolled back before this is returned.
#[derive(Debug, thiserror::Error)]
pub enum TicketWriteError {
    #[error(transparent)]
    Rejected(#[from] TicketRejection),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<BookingError> for TicketWriteError {
    fn from(error: BookingError) -> Self {
        TicketWriteError::Rejected(TicketRejection::standalone(error))
    }
}

/// Failure of a write that changes the seat layout behind booked tickets:
/// resizing a train or moving a trip onto another train.
#[derive(Debug, thiserror::Error)]
pub enum LayoutWriteError {
    /// A booked ticket would fall outside the new layout.
    #[error("Train {train_id} cannot hold the tickets already booked: {error}")]
    Stranded {
        train_id: DbId,
        #[source]
        error: BookingError,
    },

    #[error("Train with id {0} not found")]
    UnknownTrain(DbId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Whether `err` is a unique violation of the ticket seat constraint.
pub fn is_seat_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(TICKET_SEAT_CONSTRAINT)
        }
        _ => false,
    }
}
