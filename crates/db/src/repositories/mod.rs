//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Status transitions repeat
//! their preconditions in the `WHERE` clause and return `None` when the
//! guard did not match, leaving the caller to explain why.

pub mod accommodation_repo;
pub mod assignment_repo;
pub mod dashboard_repo;
pub mod hotel_repo;
pub mod maintenance_repo;
pub mod participant_repo;
pub mod resource_repo;
pub mod role_repo;
pub mod scan_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod user_repo;

pub use accommodation_repo::{AccommodationRepo, ConfirmOutcome};
pub use assignment_repo::AssignmentRepo;
pub use dashboard_repo::DashboardRepo;
pub use hotel_repo::HotelRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use participant_repo::ParticipantRepo;
pub use resource_repo::{ResourceAccessRepo, ResourceRepo};
pub use role_repo::RoleRepo;
pub use scan_repo::ScanRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use user_repo::UserRepo;
