pub mod booking;
pub mod error;
pub mod filters;
pub mod roles;
pub mod types;
