//! Seat placement rules and availability arithmetic.
//!
//! A ticket addresses a seat as a `(cargo, seat)` pair, both 1-based, inside
//! the train that runs its trip. Everything here is pure: callers load the
//! train capacity and booked counts from storage and pass them in.
//!
//! Uniqueness of `(trip, cargo, seat)` across orders is owned by the
//! `uq_tickets_trip_cargo_seat` constraint; [`validate_batch`] only catches
//! collisions inside a single request.

use std::collections::HashSet;

use crate::types::DbId;

/// Seating layout of a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainCapacity {
    pub cargo_count: i32,
    pub seats_per_cargo: i32,
}

impl TrainCapacity {
    /// Total number of seats (`cargo_count * seats_per_cargo`).
    pub fn total_seats(&self) -> i64 {
        i64::from(self.cargo_count) * i64::from(self.seats_per_cargo)
    }
}

/// A single seat a caller wants to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatRequest {
    pub trip_id: DbId,
    pub cargo: i32,
    pub seat: i32,
}

/// Reasons a ticket cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("{field} must be in range [1, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: i32,
        max: i32,
    },

    #[error("Seat {seat} in cargo {cargo} is already booked for trip {trip_id}")]
    DuplicateSeat { trip_id: DbId, cargo: i32, seat: i32 },

    #[error("Trip with id {trip_id} not found")]
    UnknownTrip { trip_id: DbId },

    #[error("An order must contain at least one ticket")]
    EmptyOrder,
}

impl BookingError {
    /// Request field the error is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            BookingError::OutOfRange { field, .. } => field,
            BookingError::DuplicateSeat { .. } => "seat",
            BookingError::UnknownTrip { .. } => "trip",
            BookingError::EmptyOrder => "tickets",
        }
    }
}

/// A [`BookingError`] pinned to the ticket that caused it.
///
/// `ticket_index` is the zero-based position in the submitted ticket list,
/// or `None` when the error concerns the request as a whole or a standalone
/// ticket write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct TicketRejection {
    pub ticket_index: Option<usize>,
    #[source]
    pub error: BookingError,
}

impl TicketRejection {
    pub fn at(index: usize, error: BookingError) -> Self {
        Self {
            ticket_index: Some(index),
            error,
        }
    }

    pub fn standalone(error: BookingError) -> Self {
        Self {
            ticket_index: None,
            error,
        }
    }
}

/// Check that `(cargo, seat)` lies inside the train's layout.
pub fn validate_placement(
    cargo: i32,
    seat: i32,
    capacity: &TrainCapacity,
) -> Result<(), BookingError> {
    check_index("cargo", cargo, capacity.cargo_count)?;
    check_index("seat", seat, capacity.seats_per_cargo)
}

fn check_index(field: &'static str, value: i32, max: i32) -> Result<(), BookingError> {
    if !(1..=max).contains(&value) {
        return Err(BookingError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// Seats still free on a trip given how many tickets are already booked.
pub fn available_seats(capacity: &TrainCapacity, booked: i64) -> i64 {
    capacity.total_seats() - booked
}

/// Validate every ticket of an order before anything is written.
///
/// `capacity_of` resolves a trip id to its train layout; `None` means the
/// trip does not exist. Stops at the first offending ticket.
pub fn validate_batch<F>(requests: &[SeatRequest], mut capacity_of: F) -> Result<(), TicketRejection>
where
    F: FnMut(DbId) -> Option<TrainCapacity>,
{
    if requests.is_empty() {
        return Err(TicketRejection::standalone(BookingError::EmptyOrder));
    }

    let mut claimed = HashSet::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let capacity = capacity_of(request.trip_id).ok_or(TicketRejection::at(
            index,
            BookingError::UnknownTrip {
                trip_id: request.trip_id,
            },
        ))?;

        validate_placement(request.cargo, request.seat, &capacity)
            .map_err(|e| TicketRejection::at(index, e))?;

        if !claimed.insert(*request) {
            return Err(TicketRejection::at(
                index,
                BookingError::DuplicateSeat {
                    trip_id: request.trip_id,
                    cargo: request.cargo,
                    seat: request.seat,
                },
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SMALL: TrainCapacity = TrainCapacity {
        cargo_count: 2,
        seats_per_cargo: 3,
    };

    fn seat(trip_id: DbId, cargo: i32, seat: i32) -> SeatRequest {
        SeatRequest {
            trip_id,
            cargo,
            seat,
        }
    }

    #[test]
    fn accepts_corner_seats() {
        assert!(validate_placement(1, 1, &SMALL).is_ok());
        assert!(validate_placement(2, 3, &SMALL).is_ok());
    }

    #[test]
    fn rejects_cargo_past_last_car() {
        assert_eq!(
            validate_placement(3, 1, &SMALL),
            Err(BookingError::OutOfRange {
                field: "cargo",
                value: 3,
                max: 2
            })
        );
    }

    #[test]
    fn rejects_zero_and_negative_indices() {
        assert_matches!(
            validate_placement(0, 1, &SMALL),
            Err(BookingError::OutOfRange { field: "cargo", .. })
        );
        assert_matches!(
            validate_placement(1, -1, &SMALL),
            Err(BookingError::OutOfRange { field: "seat", .. })
        );
    }

    #[test]
    fn rejects_seat_past_end_of_car() {
        let err = validate_placement(1, 4, &SMALL).unwrap_err();
        assert_eq!(err.field(), "seat");
        assert_eq!(err.to_string(), "seat must be in range [1, 3], got 4");
    }

    #[test]
    fn availability_is_capacity_minus_booked() {
        assert_eq!(SMALL.total_seats(), 6);
        assert_eq!(available_seats(&SMALL, 0), 6);
        assert_eq!(available_seats(&SMALL, 2), 4);
        assert_eq!(available_seats(&SMALL, 6), 0);
    }

    #[test]
    fn total_seats_does_not_overflow_i32() {
        let huge = TrainCapacity {
            cargo_count: i32::MAX,
            seats_per_cargo: 2,
        };
        assert_eq!(huge.total_seats(), i64::from(i32::MAX) * 2);
    }

    #[test]
    fn batch_rejects_empty_order() {
        let err = validate_batch(&[], |_| Some(SMALL)).unwrap_err();
        assert_eq!(err.ticket_index, None);
        assert_eq!(err.error, BookingError::EmptyOrder);
    }

    #[test]
    fn batch_reports_index_of_out_of_range_ticket() {
        let requests = [seat(1, 1, 1), seat(1, 3, 1)];
        let err = validate_batch(&requests, |_| Some(SMALL)).unwrap_err();
        assert_eq!(err.ticket_index, Some(1));
        assert_matches!(err.error, BookingError::OutOfRange { field: "cargo", .. });
    }

    #[test]
    fn batch_reports_unknown_trip() {
        let requests = [seat(7, 1, 1)];
        let err = validate_batch(&requests, |id| (id == 1).then_some(SMALL)).unwrap_err();
        assert_eq!(err.ticket_index, Some(0));
        assert_eq!(err.error, BookingError::UnknownTrip { trip_id: 7 });
    }

    #[test]
    fn batch_rejects_same_seat_twice_in_one_request() {
        let requests = [seat(1, 2, 2), seat(1, 1, 1), seat(1, 2, 2)];
        let err = validate_batch(&requests, |_| Some(SMALL)).unwrap_err();
        assert_eq!(err.ticket_index, Some(2));
        assert_eq!(
            err.error,
            BookingError::DuplicateSeat {
                trip_id: 1,
                cargo: 2,
                seat: 2
            }
        );
    }

    #[test]
    fn batch_allows_same_seat_on_different_trips() {
        let requests = [seat(1, 1, 1), seat(2, 1, 1)];
        assert!(validate_batch(&requests, |_| Some(SMALL)).is_ok());
    }
}
