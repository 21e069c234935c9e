//! Integration tests for seat booking: order placement, the seat uniqueness
//! constraint, and availability.

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use railway_core::booking::{BookingError, SeatRequest};
use railway_core::roles::PASSENGER_ROLE_ID;
use railway_db::error::{LayoutWriteError, TicketWriteError};
use railway_db::models::route::CreateRoute;
use railway_db::models::station::CreateStation;
use railway_db::models::ticket::{CreateTicket, UpdateTicket};
use railway_db::models::train::{CreateTrain, UpdateTrain};
use railway_db::models::train_type::CreateTrainType;
use railway_db::models::trip::{CreateTrip, TripSummary, UpdateTrip};
use railway_db::models::user::CreateUser;
use railway_db::repositories::{
    OrderRepo, RouteRepo, StationRepo, TicketRepo, TrainRepo, TrainTypeRepo, TripRepo, UserRepo,
};
use sqlx::PgPool;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    user_id: i64,
    trip_id: i64,
    train_id: i64,
}

/// One passenger and one trip on a 2-cargo, 3-seat train (6 seats).
async fn seed(pool: &PgPool) -> Fixture {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "passenger".to_string(),
            email: "passenger@example.com".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: PASSENGER_ROLE_ID,
        },
    )
    .await
    .unwrap();

    let mut station_ids = Vec::new();
    for name in ["Lviv", "Kyiv"] {
        let station = StationRepo::create(
            pool,
            &CreateStation {
                name: name.to_string(),
                latitude: 50.0,
                longitude: 30.0,
            },
        )
        .await
        .unwrap();
        station_ids.push(station.id);
    }
    let route = RouteRepo::create(
        pool,
        &CreateRoute {
            source: station_ids[0],
            destination: station_ids[1],
            distance: 540,
        },
    )
    .await
    .unwrap();
    let train_type = TrainTypeRepo::create(
        pool,
        &CreateTrainType {
            name: "Intercity".to_string(),
        },
    )
    .await
    .unwrap();
    let train = TrainRepo::create(
        pool,
        &CreateTrain {
            name: "Tarpan".to_string(),
            cargo_count: 2,
            seats_per_cargo: 3,
            train_type: train_type.id,
        },
    )
    .await
    .unwrap();
    let trip = TripRepo::create(
        pool,
        &CreateTrip {
            route: route.id,
            train: train.id,
            departure_time: Utc.with_ymd_and_hms(2023, 12, 10, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2023, 12, 10, 15, 0, 0).unwrap(),
            crews: vec![],
        },
    )
    .await
    .unwrap();

    Fixture {
        user_id: user.id,
        trip_id: trip.id,
        train_id: train.id,
    }
}

fn seat(trip_id: i64, cargo: i32, seat: i32) -> SeatRequest {
    SeatRequest {
        trip_id,
        cargo,
        seat,
    }
}

async fn tickets_available(pool: &PgPool, trip_id: i64) -> i64 {
    let row = TripRepo::find_summary_by_id(pool, trip_id)
        .await
        .unwrap()
        .unwrap();
    TripSummary::from(row).tickets_available
}

async fn ticket_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

async fn order_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

// ---------------------------------------------------------------------------
// Order placement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_place_order_books_every_seat(pool: PgPool) {
    let f = seed(&pool).await;

    let placed = OrderRepo::place(
        &pool,
        f.user_id,
        &[seat(f.trip_id, 1, 1), seat(f.trip_id, 2, 3)],
    )
    .await
    .unwrap();

    assert_eq!(placed.tickets.len(), 2);
    assert!(placed.tickets.iter().all(|t| t.order_id == placed.id));
    assert_eq!(tickets_available(&pool, f.trip_id).await, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_out_of_range_seat_rejects_whole_order(pool: PgPool) {
    let f = seed(&pool).await;

    let err = OrderRepo::place(
        &pool,
        f.user_id,
        &[seat(f.trip_id, 1, 1), seat(f.trip_id, 1, 4)],
    )
    .await
    .unwrap_err();

    assert_matches!(
        err,
        TicketWriteError::Rejected(ref r)
            if r.ticket_index == Some(1)
                && matches!(r.error, BookingError::OutOfRange { field: "seat", .. })
    );
    assert_eq!(order_count(&pool).await, 0);
    assert_eq!(ticket_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_taken_seat_rolls_back_order(pool: PgPool) {
    let f = seed(&pool).await;
    OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 2, 2)])
        .await
        .unwrap();

    let err = OrderRepo::place(
        &pool,
        f.user_id,
        &[seat(f.trip_id, 1, 1), seat(f.trip_id, 2, 2)],
    )
    .await
    .unwrap_err();

    assert_matches!(
        err,
        TicketWriteError::Rejected(ref r)
            if r.ticket_index == Some(1)
                && r.error == BookingError::DuplicateSeat { trip_id: f.trip_id, cargo: 2, seat: 2 }
    );
    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(ticket_count(&pool).await, 1);
    assert_eq!(tickets_available(&pool, f.trip_id).await, 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_trip_rejected(pool: PgPool) {
    let f = seed(&pool).await;

    let err = OrderRepo::place(&pool, f.user_id, &[seat(999_999, 1, 1)])
        .await
        .unwrap_err();
    assert_matches!(
        err,
        TicketWriteError::Rejected(ref r)
            if r.error == BookingError::UnknownTrip { trip_id: 999_999 }
    );
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_order_rejected_before_writing(pool: PgPool) {
    let f = seed(&pool).await;

    let err = OrderRepo::place(&pool, f.user_id, &[]).await.unwrap_err();
    assert_matches!(
        err,
        TicketWriteError::Rejected(ref r) if r.error == BookingError::EmptyOrder
    );
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_order_frees_seats(pool: PgPool) {
    let f = seed(&pool).await;
    let placed = OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 1, 1)])
        .await
        .unwrap();

    assert!(OrderRepo::delete_for_user(&pool, placed.id, f.user_id)
        .await
        .unwrap());
    assert_eq!(tickets_available(&pool, f.trip_id).await, 6);

    OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 1, 1)])
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_orders_are_scoped_to_owner(pool: PgPool) {
    let f = seed(&pool).await;
    let other = UserRepo::create(
        &pool,
        &CreateUser {
            username: "someone-else".to_string(),
            email: "else@example.com".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: PASSENGER_ROLE_ID,
        },
    )
    .await
    .unwrap();
    let placed = OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 1, 1)])
        .await
        .unwrap();

    assert!(OrderRepo::find_for_user(&pool, placed.id, other.id)
        .await
        .unwrap()
        .is_none());
    assert!(!OrderRepo::delete_for_user(&pool, placed.id, other.id)
        .await
        .unwrap());
    assert!(OrderRepo::list_for_user(&pool, other.id)
        .await
        .unwrap()
        .is_empty());

    let mine = OrderRepo::list_for_user(&pool, f.user_id).await.unwrap();
    let details = OrderRepo::with_tickets(&pool, mine).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].tickets.len(), 1);
    assert_eq!(details[0].tickets[0].trip.route, "Lviv - Kyiv");
    assert_eq!(details[0].tickets[0].trip.tickets_available, 5);
}

// ---------------------------------------------------------------------------
// Standalone ticket writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_create_checks_layout_and_uniqueness(pool: PgPool) {
    let f = seed(&pool).await;
    let placed = OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 1, 1)])
        .await
        .unwrap();

    let out_of_range = TicketRepo::create(
        &pool,
        &CreateTicket {
            cargo: 3,
            seat: 1,
            trip: f.trip_id,
            order: placed.id,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        out_of_range,
        TicketWriteError::Rejected(ref r)
            if r.ticket_index.is_none()
                && matches!(r.error, BookingError::OutOfRange { field: "cargo", .. })
    );

    let taken = TicketRepo::create(
        &pool,
        &CreateTicket {
            cargo: 1,
            seat: 1,
            trip: f.trip_id,
            order: placed.id,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        taken,
        TicketWriteError::Rejected(ref r)
            if matches!(r.error, BookingError::DuplicateSeat { .. })
    );

    let ticket = TicketRepo::create(
        &pool,
        &CreateTicket {
            cargo: 1,
            seat: 2,
            trip: f.trip_id,
            order: placed.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(ticket.order_id, placed.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_move_onto_taken_seat_is_duplicate(pool: PgPool) {
    let f = seed(&pool).await;
    let placed = OrderRepo::place(
        &pool,
        f.user_id,
        &[seat(f.trip_id, 1, 1), seat(f.trip_id, 1, 2)],
    )
    .await
    .unwrap();
    let second = &placed.tickets[1];

    let err = TicketRepo::update(
        &pool,
        second.id,
        &UpdateTicket {
            cargo: None,
            seat: Some(1),
            trip: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        TicketWriteError::Rejected(ref r)
            if matches!(r.error, BookingError::DuplicateSeat { cargo: 1, seat: 1, .. })
    );

    let moved = TicketRepo::update(
        &pool,
        second.id,
        &UpdateTicket {
            cargo: Some(2),
            seat: None,
            trip: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!((moved.cargo, moved.seat), (2, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ticket_list_is_ordered_and_filtered(pool: PgPool) {
    let f = seed(&pool).await;
    OrderRepo::place(
        &pool,
        f.user_id,
        &[seat(f.trip_id, 2, 1), seat(f.trip_id, 1, 3), seat(f.trip_id, 1, 1)],
    )
    .await
    .unwrap();

    let tickets = TicketRepo::list(&pool, Some(&[f.trip_id])).await.unwrap();
    let seats: Vec<(i32, i32)> = tickets.iter().map(|t| (t.cargo, t.seat)).collect();
    assert_eq!(seats, vec![(1, 1), (1, 3), (2, 1)]);

    assert!(TicketRepo::list(&pool, Some(&[999_999]))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(TicketRepo::list(&pool, None).await.unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Layout changes against existing bookings
// ---------------------------------------------------------------------------

fn resize(cargo_count: i32) -> UpdateTrain {
    UpdateTrain {
        name: None,
        cargo_count: Some(cargo_count),
        seats_per_cargo: None,
        train_type: None,
    }
}

fn move_to_train(train_id: i64) -> UpdateTrip {
    UpdateTrip {
        route: None,
        train: Some(train_id),
        departure_time: None,
        arrival_time: None,
        crews: None,
    }
}

/// Start a booking the way `OrderRepo::place` does and stop before commit.
async fn hold_seat(
    pool: &PgPool,
    user_id: i64,
    request: SeatRequest,
) -> sqlx::Transaction<'static, sqlx::Postgres> {
    let mut tx = pool.begin().await.unwrap();
    TrainRepo::capacities_for_trips(&mut tx, &[request.trip_id])
        .await
        .unwrap();
    let (order_id,): (i64,) =
        sqlx::query_as("INSERT INTO orders (user_id) VALUES ($1) RETURNING id")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .unwrap();
    TicketRepo::insert_if_free(&mut tx, order_id, &request)
        .await
        .unwrap()
        .expect("seat should be free");
    tx
}

/// A second train of the same type with one 3-seat cargo.
async fn create_small_train(pool: &PgPool, like: i64) -> i64 {
    let reference = TrainRepo::find_by_id(pool, like).await.unwrap().unwrap();
    TrainRepo::create(
        pool,
        &CreateTrain {
            name: "Dnipro".to_string(),
            cargo_count: 1,
            seats_per_cargo: 3,
            train_type: reference.train_type_id,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shrinking_train_below_booked_seat_is_rejected(pool: PgPool) {
    let f = seed(&pool).await;
    OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 2, 3)])
        .await
        .unwrap();

    let result = TrainRepo::update(&pool, f.train_id, &resize(1)).await;
    assert_matches!(
        result,
        Err(LayoutWriteError::Stranded { train_id, .. }) if train_id == f.train_id
    );
    let train = TrainRepo::find_by_id(&pool, f.train_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(train.cargo_count, 2);

    let grown = TrainRepo::update(&pool, f.train_id, &resize(4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grown.cargo_count, 4);
    assert_eq!(tickets_available(&pool, f.trip_id).await, 11);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resizing_unknown_train_returns_none(pool: PgPool) {
    let result = TrainRepo::update(&pool, 999_999, &resize(1)).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shrink_waits_for_booking_in_progress(pool: PgPool) {
    let f = seed(&pool).await;
    let booking = hold_seat(&pool, f.user_id, seat(f.trip_id, 2, 3)).await;

    let shrink = tokio::spawn({
        let pool = pool.clone();
        let train_id = f.train_id;
        async move { TrainRepo::update(&pool, train_id, &resize(1)).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!shrink.is_finished(), "shrink must wait for the booking");

    booking.commit().await.unwrap();

    let result = shrink.await.unwrap();
    assert_matches!(result, Err(LayoutWriteError::Stranded { .. }));
    let train = TrainRepo::find_by_id(&pool, f.train_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(train.cargo_count, 2);
    assert_eq!(ticket_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_trip_to_smaller_train_is_rejected(pool: PgPool) {
    let f = seed(&pool).await;
    let small = create_small_train(&pool, f.train_id).await;
    OrderRepo::place(&pool, f.user_id, &[seat(f.trip_id, 2, 3)])
        .await
        .unwrap();

    let result = TripRepo::update(&pool, f.trip_id, &move_to_train(small)).await;
    assert_matches!(
        result,
        Err(LayoutWriteError::Stranded { train_id, .. }) if train_id == small
    );

    let unknown = TripRepo::update(&pool, f.trip_id, &move_to_train(999_999)).await;
    assert_matches!(unknown, Err(LayoutWriteError::UnknownTrain(999_999)));

    let trip = TripRepo::find_by_id(&pool, f.trip_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trip.train_id, f.train_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trip_move_waits_for_booking_in_progress(pool: PgPool) {
    let f = seed(&pool).await;
    let small = create_small_train(&pool, f.train_id).await;
    let booking = hold_seat(&pool, f.user_id, seat(f.trip_id, 2, 3)).await;

    let retarget = tokio::spawn({
        let pool = pool.clone();
        let trip_id = f.trip_id;
        async move { TripRepo::update(&pool, trip_id, &move_to_train(small)).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!retarget.is_finished(), "trip move must wait for the booking");

    booking.commit().await.unwrap();

    let result = retarget.await.unwrap();
    assert_matches!(result, Err(LayoutWriteError::Stranded { .. }));
    let trip = TripRepo::find_by_id(&pool, f.trip_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(trip.train_id, f.train_id);
}

// ---------------------------------------------------------------------------
// Concurrent bookings of the same seat
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_racing_an_open_booking_rolls_back(pool: PgPool) {
    let f = seed(&pool).await;
    let holder = hold_seat(&pool, f.user_id, seat(f.trip_id, 1, 1)).await;

    let racer = tokio::spawn({
        let pool = pool.clone();
        let (user_id, trip_id) = (f.user_id, f.trip_id);
        async move {
            OrderRepo::place(&pool, user_id, &[seat(trip_id, 1, 2), seat(trip_id, 1, 1)]).await
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    holder.commit().await.unwrap();

    let result = racer.await.unwrap();
    assert_matches!(
        result,
        Err(TicketWriteError::Rejected(rejection)) => {
            assert_eq!(rejection.ticket_index, Some(1));
            assert_matches!(
                rejection.error,
                BookingError::DuplicateSeat { cargo: 1, seat: 1, .. }
            );
        }
    );

    let tickets = TicketRepo::list(&pool, Some(&[f.trip_id])).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!((tickets[0].cargo, tickets[0].seat), (1, 1));
}
