use std::borrow::Cow;

use proptest::prelude::*;
use xmlbind_engine::chars::Chars;
use xmlbind_engine::whitespace::{self, WhitespaceMode, collapse, normalize, replace};

// Mix of XML whitespace, plain text and a few multi-byte characters.
fn text() -> impl Strategy<Value = String> {
    "[ \t\r\na-zé€\u{a0}]{0,40}"
}

proptest! {
    #[test]
    fn prop_collapse_is_idempotent(s in text()) {
        let once = collapse(&s).into_owned();
        let twice = collapse(&once);
        prop_assert_eq!(twice.as_ref(), once.as_str());
    }

    #[test]
    fn prop_preserve_is_identity(s in text()) {
        let out = normalize(&s, WhitespaceMode::Preserve);
        prop_assert!(matches!(out, Cow::Borrowed(_)));
        prop_assert_eq!(out.as_ref(), s.as_str());
    }

    #[test]
    fn prop_replace_keeps_length(s in text()) {
        let out = replace(&s);
        prop_assert_eq!(out.len(), s.len());
        prop_assert!(!out.contains(['\t', '\n', '\r']));
    }

    #[test]
    fn prop_collapse_has_no_edges_or_runs(s in text()) {
        let out = collapse(&s);
        prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains(['\t', '\n', '\r']));
        // U+00A0 is not XML whitespace and survives
        prop_assert_eq!(out.matches('\u{a0}').count(), s.matches('\u{a0}').count());
    }

    #[test]
    fn prop_chars_view_matches_slice(s in text(), a in 0usize..48, b in 0usize..48) {
        let (lo, hi) = (a.min(b), a.max(b));
        match Chars::new(&s, lo, hi - lo) {
            Ok(view) => prop_assert_eq!(view.as_str(), &s[lo..hi]),
            Err(_) => prop_assert!(hi > s.len() || !s.is_char_boundary(lo) || !s.is_char_boundary(hi)),
        }
    }
}

#[test]
fn collapse_only_borrows_when_trimming_suffices() {
    assert!(matches!(collapse("  a b  "), Cow::Borrowed("a b")));
    assert!(matches!(collapse("a  b"), Cow::Owned(_)));
    assert!(matches!(collapse("a\tb"), Cow::Owned(_)));
    assert_eq!(collapse(" \t\n "), "");
    assert!(whitespace::is_all_whitespace(" \t\r\n"));
}
