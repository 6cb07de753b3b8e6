//! Profile Completeness Inspection
//!
//! Pure decision logic: given a profile snapshot, decide whether the member
//! may post and why not. No gateway calls happen here, which keeps the
//! checks independently testable.

use super::traits::UserProfile;

/// Outcome of a profile inspection.
///
/// `reasons` is empty iff `passed` is true. Constructed fresh per
/// inspection; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl Verdict {
    /// A passing verdict with no reasons.
    pub fn pass() -> Self {
        Self {
            passed: true,
            reasons: Vec::new(),
        }
    }

    /// Reasons joined for display: "reason one and reason two".
    pub fn reasons_text(&self) -> String {
        self.reasons.join(" and ")
    }
}

/// Profile inspector.
///
/// Checks are applied cumulatively, not short-circuiting: a profile missing
/// both a photo and a valid name gets both reasons, in fixed order (photo
/// before name).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileInspector;

impl ProfileInspector {
    pub fn new() -> Self {
        Self
    }

    pub fn inspect(&self, profile: &UserProfile) -> Verdict {
        let mut reasons = Vec::new();

        if !profile.has_visible_photo {
            reasons.push("no profile photo (or it is private)".to_string());
        }

        if !contains_letter(&profile.display_name) {
            reasons.push("invalid name (symbols/emoji only)".to_string());
        }

        Verdict {
            passed: reasons.is_empty(),
            reasons,
        }
    }
}

/// True when the name contains at least one Unicode letter.
///
/// `char::is_alphabetic` classifies the full Unicode letter categories, so
/// names written entirely in Cyrillic, CJK, Arabic etc. pass without any
/// ASCII letters. Emoji, punctuation and digits do not count.
fn contains_letter(name: &str) -> bool {
    name.chars().any(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::traits::UserId;
    use proptest::prelude::*;

    fn profile(name: &str, has_photo: bool) -> UserProfile {
        UserProfile {
            user_id: UserId(1),
            display_name: name.to_string(),
            has_visible_photo: has_photo,
        }
    }

    #[test]
    fn test_complete_profile_passes() {
        let verdict = ProfileInspector::new().inspect(&profile("Alice", true));
        assert!(verdict.passed);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_missing_photo_fails() {
        let verdict = ProfileInspector::new().inspect(&profile("Alice", false));
        assert!(!verdict.passed);
        assert_eq!(
            verdict.reasons,
            vec!["no profile photo (or it is private)".to_string()]
        );
    }

    #[test]
    fn test_symbol_only_name_fails() {
        let verdict = ProfileInspector::new().inspect(&profile("😀😀", true));
        assert!(!verdict.passed);
        assert_eq!(
            verdict.reasons,
            vec!["invalid name (symbols/emoji only)".to_string()]
        );
    }

    #[test]
    fn test_both_checks_fail_in_fixed_order() {
        // Not short-circuiting: both reasons collected, photo before name
        let verdict = ProfileInspector::new().inspect(&profile("😀😀", false));
        assert!(!verdict.passed);
        assert_eq!(verdict.reasons.len(), 2);
        assert!(verdict.reasons[0].contains("photo"));
        assert!(verdict.reasons[1].contains("name"));
    }

    #[test]
    fn test_reasons_text_joins_with_and() {
        let verdict = ProfileInspector::new().inspect(&profile("!!!", false));
        assert_eq!(
            verdict.reasons_text(),
            "no profile photo (or it is private) and invalid name (symbols/emoji only)"
        );
    }

    #[test]
    fn test_non_ascii_letters_pass() {
        // A single letter from any script is enough, no ASCII required
        for name in ["José", "Андрей", "محمد", "山田", "Ελένη"] {
            let verdict = ProfileInspector::new().inspect(&profile(name, true));
            assert!(verdict.passed, "name {:?} should pass", name);
        }
    }

    #[test]
    fn test_letterless_names_fail() {
        for name in ["😀😀", "...", "1234", "⭐⭐⭐", "", "!@#$%", "٣٤٥"] {
            let verdict = ProfileInspector::new().inspect(&profile(name, true));
            assert!(!verdict.passed, "name {:?} should fail", name);
        }
    }

    #[test]
    fn test_pass_verdict_has_no_reasons() {
        let verdict = Verdict::pass();
        assert!(verdict.passed);
        assert!(verdict.reasons.is_empty());
        assert_eq!(verdict.reasons_text(), "");
    }

    proptest! {
        /// Property: passed == has_photo && name contains a letter,
        /// and reasons is empty iff passed.
        #[test]
        fn prop_verdict_matches_checks(name in "\\PC*", has_photo in proptest::bool::ANY) {
            let verdict = ProfileInspector::new().inspect(&profile(&name, has_photo));
            let has_letter = name.chars().any(char::is_alphabetic);

            prop_assert_eq!(verdict.passed, has_photo && has_letter);
            prop_assert_eq!(verdict.reasons.is_empty(), verdict.passed);
        }

        /// Property: reasons are always a subset of the two known texts,
        /// photo first.
        #[test]
        fn prop_reasons_order_is_fixed(name in "\\PC*", has_photo in proptest::bool::ANY) {
            let verdict = ProfileInspector::new().inspect(&profile(&name, has_photo));
            prop_assert!(verdict.reasons.len() <= 2);
            if verdict.reasons.len() == 2 {
                prop_assert!(verdict.reasons[0].contains("photo"));
                prop_assert!(verdict.reasons[1].contains("name"));
            }
        }
    }
}
