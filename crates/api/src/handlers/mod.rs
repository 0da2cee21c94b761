//! Request handlers, one module per resource.
//!
//! Handlers check roles through the extractors in [`crate::middleware`],
//! delegate persistence to the repositories in `confdesk_db`, and map
//! failures through [`AppError`](crate::error::AppError).

pub mod admin;
pub mod assignments;
pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod hotels;
pub mod maintenance;
pub mod participants;
pub mod resources;
pub mod scans;
pub mod settings;
