//! Property-based tests for message body validation

use proptest::prelude::*;
use pulsechat::shared::validation::{validate_message_body, MAX_MESSAGE_LEN};

proptest! {
    #[test]
    fn test_accepted_body_is_sanitized_and_bounded(body in "\\PC{0,64}") {
        if let Ok(clean) = validate_message_body(&body) {
            prop_assert!(!clean.is_empty());
            prop_assert!(!clean.contains('<') && !clean.contains('>'));
            prop_assert!(clean.chars().count() <= MAX_MESSAGE_LEN);
        }
    }

    #[test]
    fn test_whitespace_only_rejected(body in "[ \\t\\n]{0,32}") {
        prop_assert!(validate_message_body(&body).is_err());
    }

    #[test]
    fn test_oversized_rejected(extra in 1usize..64) {
        let body = "a".repeat(MAX_MESSAGE_LEN + extra);
        prop_assert!(validate_message_body(&body).is_err());
    }
}
