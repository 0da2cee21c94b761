//! Hotel model and DTOs.

use confdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hotels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hotel {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub whatsapp_phone: String,
    /// Price per night in whole currency units.
    pub nightly_rate: i32,
    /// Rooms reserved for the event; confirmations beyond this are refused.
    pub room_capacity: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateHotel {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub whatsapp_phone: String,
    pub nightly_rate: Option<i32>,
    pub room_capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHotel {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub nightly_rate: Option<i32>,
    pub room_capacity: Option<i32>,
    pub is_active: Option<bool>,
}
