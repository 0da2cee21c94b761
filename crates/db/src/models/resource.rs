//! Resource and resource-access models and DTOs.

use confdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `resources` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resource {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Only accredited participants may receive this resource.
    pub requires_accreditation: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateResource {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub requires_accreditation: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateResource {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub requires_accreditation: Option<bool>,
}

/// A row from the `resource_accesses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceAccess {
    pub id: DbId,
    pub resource_id: DbId,
    pub participant_id: DbId,
    pub granted_by: Option<DbId>,
    pub granted_at: Timestamp,
}

/// A resource as seen by one participant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantResource {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub requires_accreditation: bool,
    /// When the participant received it, `None` if not yet.
    pub granted_at: Option<Timestamp>,
}
