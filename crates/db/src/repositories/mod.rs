//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement writes open
//! their own transaction; `*_inner` helpers and booking lookups take the
//! caller's transaction instead.

pub mod crew_repo;
pub mod order_repo;
pub mod role_repo;
pub mod route_repo;
pub mod session_repo;
pub mod station_repo;
pub mod ticket_repo;
pub mod train_repo;
pub mod train_type_repo;
pub mod trip_repo;
pub mod user_repo;

pub use crew_repo::CrewRepo;
pub use order_repo::OrderRepo;
pub use role_repo::RoleRepo;
pub use route_repo::RouteRepo;
pub use session_repo::SessionRepo;
pub use station_repo::StationRepo;
pub use ticket_repo::TicketRepo;
pub use train_repo::TrainRepo;
pub use train_type_repo::TrainTypeRepo;
pub use trip_repo::TripRepo;
pub use user_repo::UserRepo;
