//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where the entity is editable

pub mod accommodation;
pub mod assignment;
pub mod dashboard;
pub mod hotel;
pub mod maintenance;
pub mod participant;
pub mod resource;
pub mod role;
pub mod scan;
pub mod session;
pub mod setting;
pub mod user;
