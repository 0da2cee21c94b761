//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000002_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_VALIDATOR: &str = "validator";
pub const ROLE_PARTICIPANT: &str = "participant";

/// Seeded id of the `participant` role, assigned on self-registration.
pub const PARTICIPANT_ROLE_ID: i64 = 3;

/// Whether the role may perform validator duties (scans, distribution).
///
/// Admins inherit every validator capability.
pub fn can_validate(role: &str) -> bool {
    role == ROLE_VALIDATOR || role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_validator_can_validate() {
        assert!(can_validate(ROLE_ADMIN));
        assert!(can_validate(ROLE_VALIDATOR));
        assert!(!can_validate(ROLE_PARTICIPANT));
        assert!(!can_validate("unknown"));
    }
}
