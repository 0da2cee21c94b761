//! Domain logic for the ConfDesk conference backend.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates call into these modules to validate input and decide
//! status transitions before touching storage.

pub mod booking;
pub mod error;
pub mod lifecycle;
pub mod maintenance;
pub mod paging;
pub mod reference;
pub mod roles;
pub mod scan;
pub mod settings;
pub mod types;
