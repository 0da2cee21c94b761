use confdesk_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// One of the three seeded roles: admin, validator, participant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}
