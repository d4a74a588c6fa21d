//! Property-based tests for tag sanitization.
//!
//! Reader input is arbitrary keystroke noise; these properties pin down what
//! the pipeline can rely on after sanitization.

use proptest::prelude::*;
use smartsub_core::{Tag, is_tag_char, sanitize_tag};

/// Strategy for canonical tags (what a healthy reader emits).
fn canonical_tag() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{1,32}")
        .expect("Failed to create tag regex strategy")
}

proptest! {
    /// Property: sanitized output only contains allowed characters.
    #[test]
    fn prop_output_is_canonical(raw in ".{0,64}") {
        let clean = sanitize_tag(&raw);
        prop_assert!(clean.chars().all(is_tag_char));
    }

    /// Property: sanitizing twice changes nothing.
    #[test]
    fn prop_sanitize_is_idempotent(raw in ".{0,64}") {
        let once = sanitize_tag(&raw);
        prop_assert_eq!(sanitize_tag(&once), once);
    }

    /// Property: canonical tags survive surrounding whitespace and noise symbols.
    #[test]
    fn prop_canonical_tag_survives_noise(
        tag in canonical_tag(),
        lead in "[ \t]{0,4}",
        trail in "[ \t\r\n]{0,4}",
    ) {
        let raw = format!("{lead}{tag}{trail}");
        prop_assert_eq!(sanitize_tag(&raw), tag.clone());

        let parsed = Tag::sanitize(&raw).expect("canonical tag must not sanitize to empty");
        prop_assert_eq!(parsed.as_str(), tag.as_str());
    }

    /// Property: `Tag::sanitize` is `None` exactly when the sanitized text is empty.
    #[test]
    fn prop_empty_means_no_tag(raw in "[ #$%!@*()+=/.,]{0,16}") {
        prop_assert_eq!(Tag::sanitize(&raw).is_none(), sanitize_tag(&raw).is_empty());
    }
}
