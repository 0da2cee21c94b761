//! Registration reference codes.
//!
//! A reference code (`CONF-7KQ2XH9P`) is printed on the participant's badge
//! as a QR code and quoted in bank-transfer descriptions so admins can
//! reconcile payments. The random part avoids glyphs that are easy to
//! confuse when read aloud or typed from a receipt (`0 O 1 I L`).

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::error::CoreError;

/// Characters used for the random part of a code.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of the random part of a code.
pub const CODE_LENGTH: usize = 8;

/// Default prefix when none is configured.
pub const DEFAULT_PREFIX: &str = "CONF";

/// Attempts before giving up on finding an unused code.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2,8}-[A-HJKMNP-Z2-9]{8}$").expect("valid regex")
});

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,8}$").expect("valid regex"));

/// Validate a configured code prefix (2-8 upper-case ASCII letters).
pub fn validate_prefix(prefix: &str) -> Result<(), CoreError> {
    if PREFIX_RE.is_match(prefix) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Reference prefix must be 2-8 upper-case letters, got '{prefix}'"
        )))
    }
}

/// Generate a fresh random code with the given prefix.
pub fn generate(prefix: &str) -> String {
    let mut rng = rand::rng();
    let random: String = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{random}")
}

/// Normalize user input: trim whitespace and upper-case.
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Validate an already-normalized code.
pub fn validate(code: &str) -> Result<(), CoreError> {
    if CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid reference code: '{code}'"
        )))
    }
}

/// Normalize and validate in one step, returning the canonical code.
pub fn parse(input: &str) -> Result<String, CoreError> {
    let code = normalize(input);
    validate(&code)?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..200 {
            let code = generate(DEFAULT_PREFIX);
            assert!(validate(&code).is_ok(), "generated code {code} must validate");
            assert_eq!(code.len(), DEFAULT_PREFIX.len() + 1 + CODE_LENGTH);
        }
    }

    #[test]
    fn generated_codes_skip_ambiguous_glyphs() {
        for _ in 0..200 {
            let code = generate("AB");
            let random = &code[3..];
            assert!(!random.chars().any(|c| "0O1IL".contains(c)));
        }
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(parse("  conf-7kq2xh9p \n").unwrap(), "CONF-7KQ2XH9P");
    }

    #[test]
    fn invalid_codes_rejected() {
        assert!(parse("").is_err());
        assert!(parse("CONF-").is_err());
        assert!(parse("CONF-7KQ2XH9").is_err(), "too short");
        assert!(parse("CONF-7KQ2XH0P").is_err(), "contains zero");
        assert!(parse("C-7KQ2XH9P").is_err(), "prefix too short");
        assert!(parse("CONF7KQ2XH9P").is_err(), "missing separator");
    }

    #[test]
    fn prefix_validation() {
        assert!(validate_prefix("CONF").is_ok());
        assert!(validate_prefix("conf").is_err());
        assert!(validate_prefix("C").is_err());
        assert!(validate_prefix("TOOLONGPREFIX").is_err());
    }
}
