//! Key-value event configuration (the `settings` table).
//!
//! Any well-formed key may be stored; the keys below are the ones the
//! server itself reads and therefore have typed validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::booking;
use crate::error::CoreError;
use crate::scan;

pub const KEY_EVENT_NAME: &str = "event_name";
pub const KEY_REGISTRATION_OPEN: &str = "registration_open";
pub const KEY_REGISTRATION_FEE: &str = "registration_fee";
pub const KEY_BANK_ACCOUNT: &str = "bank_account";
pub const KEY_WHATSAPP_NUMBER: &str = "whatsapp_number";
pub const KEY_MEAL_SLOTS: &str = "meal_slots";

/// Keys readable without authentication (shown on the sign-up page).
pub const PUBLIC_KEYS: &[&str] = &[
    KEY_EVENT_NAME,
    KEY_REGISTRATION_OPEN,
    KEY_REGISTRATION_FEE,
    KEY_BANK_ACCOUNT,
    KEY_WHATSAPP_NUMBER,
];

/// Upper bound on a stored value.
pub const MAX_VALUE_LEN: usize = 4_000;

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid regex"));

static FEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,9}(\.\d{1,2})?$").expect("valid regex"));

pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid setting key '{key}': use lower_snake_case, at most 64 characters"
        )))
    }
}

pub fn is_public(key: &str) -> bool {
    PUBLIC_KEYS.contains(&key)
}

/// Validate a value for `key`. Unknown keys only get the length check.
pub fn validate_value(key: &str, value: &str) -> Result<(), CoreError> {
    if value.len() > MAX_VALUE_LEN {
        return Err(CoreError::Validation(format!(
            "Setting value exceeds {MAX_VALUE_LEN} characters"
        )));
    }

    match key {
        KEY_REGISTRATION_OPEN => parse_bool(value).map(|_| ()),
        KEY_REGISTRATION_FEE => {
            if FEE_RE.is_match(value) {
                Ok(())
            } else {
                Err(CoreError::Validation(format!(
                    "registration_fee must be a non-negative amount, got '{value}'"
                )))
            }
        }
        KEY_WHATSAPP_NUMBER => booking::normalize_phone(value).map(|_| ()),
        KEY_MEAL_SLOTS => {
            for slot in parse_list(value) {
                scan::validate_meal_slot(&slot)?;
            }
            Ok(())
        }
        KEY_EVENT_NAME if value.trim().is_empty() => Err(CoreError::Validation(
            "event_name must not be empty".into(),
        )),
        _ => Ok(()),
    }
}

/// Parse a boolean setting value (`true` / `false`, case-insensitive).
pub fn parse_bool(value: &str) -> Result<bool, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(CoreError::Validation(format!(
            "Expected 'true' or 'false', got '{other}'"
        ))),
    }
}

/// Split a comma-separated setting into trimmed, non-empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
