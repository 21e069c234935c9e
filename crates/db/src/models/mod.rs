//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches
//! - Where the API embeds related entities, a read-side detail struct

pub mod crew;
pub mod order;
pub mod role;
pub mod route;
pub mod session;
pub mod station;
pub mod ticket;
pub mod train;
pub mod train_type;
pub mod trip;
pub mod user;
