//! Refresh-token sessions.

use confdesk_core::types::{DbId, Timestamp};

/// A refresh session about to be stored. Only the token's digest is kept.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Client `User-Agent`, for telling a phone scanner from a desk laptop.
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
