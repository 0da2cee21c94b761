//! Validator scan kinds, QR payload parsing, and meal slot rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reference;

pub const SCAN_KIND_ACCREDITATION: &str = "accreditation";
pub const SCAN_KIND_MEAL: &str = "meal";
pub const SCAN_KIND_RESOURCE: &str = "resource";

/// URI scheme printed into badge QR codes.
pub const QR_URI_PREFIX: &str = "confdesk://participant/";

/// Maximum length of a meal slot identifier.
pub const MAX_MEAL_SLOT_LEN: usize = 64;

static MEAL_SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// What a scan recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Accreditation,
    Meal,
    Resource,
}

impl ScanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accreditation => SCAN_KIND_ACCREDITATION,
            Self::Meal => SCAN_KIND_MEAL,
            Self::Resource => SCAN_KIND_RESOURCE,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            SCAN_KIND_ACCREDITATION => Ok(Self::Accreditation),
            SCAN_KIND_MEAL => Ok(Self::Meal),
            SCAN_KIND_RESOURCE => Ok(Self::Resource),
            other => Err(CoreError::Validation(format!(
                "Unknown scan kind: '{other}'"
            ))),
        }
    }
}

/// Extract the reference code from a scanned QR payload.
///
/// Badges encode either the bare code or `confdesk://participant/{code}`.
/// Manual entry at the desk goes through the same path.
pub fn parse_payload(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let code = match trimmed.get(..QR_URI_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(QR_URI_PREFIX) => &trimmed[QR_URI_PREFIX.len()..],
        _ => trimmed,
    };
    reference::parse(code.trim_end_matches('/'))
}

/// Build the QR payload for a reference code.
pub fn payload_for(reference_code: &str) -> String {
    format!("{QR_URI_PREFIX}{reference_code}")
}

/// Validate a meal slot identifier such as `day1-lunch`.
pub fn validate_meal_slot(slot: &str) -> Result<(), CoreError> {
    if slot.is_empty() || slot.len() > MAX_MEAL_SLOT_LEN || !MEAL_SLOT_RE.is_match(slot) {
        return Err(CoreError::Validation(format!(
            "Invalid meal slot '{slot}': use lower-case words joined by '-' (e.g. day1-lunch)"
        )));
    }
    Ok(())
}

/// Check `slot` against the configured list of served meal slots.
///
/// An empty configuration means any well-formed slot is accepted.
pub fn ensure_meal_slot_configured(slot: &str, configured: &[String]) -> Result<(), CoreError> {
    validate_meal_slot(slot)?;
    if configured.is_empty() || configured.iter().any(|s| s == slot) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Meal slot '{slot}' is not served at this event"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn payload_accepts_bare_code() {
        assert_eq!(parse_payload("CONF-7KQ2XH9P").unwrap(), "CONF-7KQ2XH9P");
    }

    #[test]
    fn payload_accepts_uri_form() {
        assert_eq!(
            parse_payload("confdesk://participant/conf-7kq2xh9p/").unwrap(),
            "CONF-7KQ2XH9P"
        );
        assert_eq!(
            parse_payload(&payload_for("CONF-7KQ2XH9P")).unwrap(),
            "CONF-7KQ2XH9P"
        );
    }

    #[test]
    fn payload_rejects_garbage() {
        assert_matches!(parse_payload("hello"), Err(CoreError::Validation(_)));
        assert_matches!(
            parse_payload("https://example.com/CONF-7KQ2XH9P"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn meal_slot_format() {
        assert!(validate_meal_slot("day1-lunch").is_ok());
        assert!(validate_meal_slot("dinner").is_ok());
        assert!(validate_meal_slot("").is_err());
        assert!(validate_meal_slot("Day1-Lunch").is_err());
        assert!(validate_meal_slot("day1--lunch").is_err());
        assert!(validate_meal_slot("-lunch").is_err());
        assert!(validate_meal_slot(&"a".repeat(65)).is_err());
    }

    #[test]
    fn meal_slot_must_be_configured_when_list_present() {
        let slots = vec!["day1-lunch".to_string(), "day1-dinner".to_string()];
        assert!(ensure_meal_slot_configured("day1-lunch", &slots).is_ok());
        assert!(ensure_meal_slot_configured("day2-lunch", &slots).is_err());
        assert!(ensure_meal_slot_configured("day2-lunch", &[]).is_ok());
    }

    #[test]
    fn scan_kind_parse() {
        assert_eq!(ScanKind::parse("meal").unwrap(), ScanKind::Meal);
        assert_eq!(ScanKind::Resource.as_str(), "resource");
        assert!(ScanKind::parse("lunch").is_err());
    }
}
