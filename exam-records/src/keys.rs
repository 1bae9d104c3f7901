//! Course label to document key derivation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{RecordError, RecordResult};

/// Top-level field holding the venue summary across all of a user's exams.
pub const ALL_EXAMS_VENUE: &str = "All_Exams_Venue";

/// Top-level fields that are not course entries.
pub const RESERVED_FIELDS: &[&str] = &[ALL_EXAMS_VENUE];

static NON_WORD_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_]+").expect("static pattern compiles")
});

/// Replace every maximal run of characters outside `[A-Za-z0-9_]` with a
/// single `_`.
///
/// Total and idempotent. Labels that differ only in punctuation or
/// whitespace map to the same key.
pub fn sanitize_course_key(raw: &str) -> String {
    NON_WORD_RUN.replace_all(raw, "_").into_owned()
}

pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Sanitize `raw` and check the result is usable as a course field name.
///
/// Rejects empty keys, reserved top-level names and `__name__` keys, which
/// document stores keep for themselves.
pub fn course_key(raw: &str) -> RecordResult<String> {
    let key = sanitize_course_key(raw);
    if key.is_empty() {
        return Err(RecordError::invalid("course label must not be empty"));
    }
    if is_reserved_field(&key) {
        return Err(RecordError::invalid(format!(
            "course label '{}' collides with reserved field '{}'",
            raw, key
        )));
    }
    if key.len() > 4 && key.starts_with("__") && key.ends_with("__") {
        return Err(RecordError::invalid(format!(
            "course key '{}' uses the store's reserved __name__ form",
            key
        )));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitizes_course_titles() {
        assert_eq!(
            sanitize_course_key("UGBS303 - COMPUTER APPLICATIONS IN MANAGEMENT"),
            "UGBS303_COMPUTER_APPLICATIONS_IN_MANAGEMENT"
        );
        assert_eq!(sanitize_course_key("DCIT 101: Intro (Day)"), "DCIT_101_Intro_Day_");
        assert_eq!(sanitize_course_key("already_clean_1"), "already_clean_1");
        assert_eq!(sanitize_course_key(""), "");
        assert_eq!(sanitize_course_key("Économie"), "_conomie");
    }

    #[test]
    fn punctuation_variants_collapse() {
        assert_eq!(
            sanitize_course_key("MATH 121 - Calculus"),
            sanitize_course_key("MATH 121 -- Calculus")
        );
        assert_eq!(sanitize_course_key("a - b"), sanitize_course_key("a/b"));
    }

    #[test]
    fn course_key_rejects_reserved_and_empty() {
        assert!(course_key("").is_err());
        assert!(course_key("All Exams Venue").is_err());
        assert!(course_key("__name__").is_err());
        assert_eq!(course_key("---").unwrap(), "_");
        assert_eq!(course_key("UGBS 303").unwrap(), "UGBS_303");
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(raw in ".*") {
            let once = sanitize_course_key(&raw);
            prop_assert_eq!(sanitize_course_key(&once), once);
        }

        #[test]
        fn sanitized_keys_are_word_characters_without_runs(raw in ".*") {
            let key = sanitize_course_key(&raw);
            prop_assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            prop_assert!(key.len() <= raw.len());
        }

        #[test]
        fn non_word_runs_become_one_underscore(word in "[A-Za-z0-9]{1,8}", sep in "[ \\-:/.,()]{1,6}") {
            let raw = format!("{word}{sep}{word}");
            prop_assert_eq!(sanitize_course_key(&raw), format!("{word}_{word}"));
        }
    }
}
