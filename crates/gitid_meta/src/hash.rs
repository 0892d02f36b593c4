//! Validation for Git object digests.

use crate::error::MetadataError;

/// Length in characters of a hex-encoded 160-bit Git object digest.
pub const HASH_LEN: usize = 40;

/// Returns true iff `value` is a 40-character hexadecimal string.
/// Case-insensitive; lower-casing happens during normalization, not here.
pub fn is_valid_hash(value: &str) -> bool {
    value.len() == HASH_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Guard that rejects malformed digests with a typed error carrying the
/// field name and the offending value. Never fixes up input.
pub fn validate_hash(value: &str, field: &'static str) -> Result<(), MetadataError> {
    if is_valid_hash(value) {
        Ok(())
    } else {
        Err(MetadataError::InvalidHash {
            field,
            hash: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_40_hex_characters_any_case() {
        let lower = "abc123def4567890abc123def4567890abc123de";
        let upper = lower.to_ascii_uppercase();
        let mixed = "ABC123def4567890abc123DEF4567890abc123de";

        assert!(is_valid_hash(lower));
        assert!(is_valid_hash(&upper));
        assert!(is_valid_hash(mixed));
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        let cases = [
            "",
            "abc123",
            "abc123def4567890abc123def4567890abc123d",   // 39
            "abc123def4567890abc123def4567890abc123def", // 41
            "xyz123def4567890abc123def4567890abc123de",  // non-hex
        ];

        for case in cases {
            assert!(!is_valid_hash(case), "{case:?} should be invalid");
        }
    }

    #[test]
    fn validate_hash_reports_field_and_value() {
        let err = validate_hash("nope", "commitHash").unwrap_err();
        assert_eq!(
            err,
            MetadataError::InvalidHash {
                field: "commitHash",
                hash: "nope".to_string(),
            }
        );
    }
}
