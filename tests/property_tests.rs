//! Property-based tests for course keys and force-publish.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use coursekeeper::audit::MemoryAuditLog;
use coursekeeper::core::course_key::{CourseKey, KeyError, KeyStyle};
use coursekeeper::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};
use coursekeeper::publish::{ForcePublish, ForcePublishError, ForcePublishRequest, ForcePublishResult};
use coursekeeper::store::{LegacyStore, MemoryStore, VersionStore};

/// Strategy for one key component (ORG, COURSE or RUN).
fn component() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.~-]{1,16}"
}

/// Strategy for 24-character object-id style versions.
fn version() -> impl Strategy<Value = ContentVersion> {
    "[0-9a-f]{24}".prop_map(|s| ContentVersion::new(s).unwrap())
}

fn staff() -> Actor {
    Actor::new("staff").unwrap()
}

fn run(store: &dyn VersionStore, text: &str, dry_run: bool) -> ForcePublishResult {
    let audit = MemoryAuditLog::new();
    ForcePublish::new(store, &audit).run(&ForcePublishRequest::new(text, dry_run, staff()))
}

proptest! {
    /// Versioned keys parse and display canonically.
    #[test]
    fn versioned_key_roundtrip(org in component(), course in component(), run in component()) {
        let text = format!("course-v1:{}+{}+{}", org, course, run);
        let key = CourseKey::parse(&text).unwrap();

        prop_assert_eq!(key.style(), KeyStyle::Versioned);
        prop_assert_eq!(key.org(), org.as_str());
        prop_assert_eq!(key.to_string(), text.clone());
        prop_assert_eq!(CourseKey::parse(&key.to_string()).unwrap(), key.clone());

        let qualified = format!("{}+branch@published-branch", text);
        prop_assert_eq!(CourseKey::parse(&qualified).unwrap(), key);
    }

    /// Deprecated slash keys parse and display canonically.
    #[test]
    fn deprecated_key_roundtrip(org in component(), course in component(), run in component()) {
        let text = format!("{}/{}/{}", org, course, run);
        let key = CourseKey::parse(&text).unwrap();

        prop_assert!(key.is_deprecated());
        prop_assert_eq!(key.to_string(), text);
        prop_assert_eq!(key.for_branch(Branch::Draft).to_string(), key.to_string());
    }

    /// Surrounding whitespace never changes the parsed key.
    #[test]
    fn whitespace_is_trimmed(org in component(), pad in "[ \t\n]{0,4}") {
        let text = format!("course-v1:{}+c+r", org);
        let padded = format!("{}{}{}", pad, text, pad);
        prop_assert_eq!(CourseKey::parse(&padded).unwrap(), CourseKey::parse(&text).unwrap());
    }

    /// Whitespace-only text is empty, never malformed.
    #[test]
    fn blank_text_is_empty(text in "[ \t\r\n]{0,8}") {
        prop_assert_eq!(CourseKey::parse(&text), Err(KeyError::Empty));
    }

    /// Text without a prefix or separator is malformed.
    #[test]
    fn bare_words_are_malformed(word in "[A-Za-z0-9]{1,20}") {
        prop_assert!(matches!(CourseKey::parse(&word), Err(KeyError::Malformed(_))));
    }

    /// Keys with a forbidden character in a component are malformed.
    #[test]
    fn forbidden_characters_rejected(
        org in component(),
        bad in prop::sample::select(vec!['!', '@', '#', ' ', '/', ':', '%']),
    ) {
        let text = format!("course-v1:{}{}+c+r", org, bad);
        prop_assert!(matches!(CourseKey::parse(&text), Err(KeyError::Malformed(_))));
    }

    /// Equal pointers are a no-op in either mode.
    #[test]
    fn published_course_is_noop(v in version(), dry_run in any::<bool>()) {
        let store = MemoryStore::new();
        let course = CourseKey::parse("course-v1:e+d+X").unwrap();
        let versions = BranchVersionMap::new(v.clone(), v);
        store.insert_course(course.clone(), versions.clone());

        let result = run(&store, "course-v1:e+d+X", dry_run);
        let is_noop = matches!(result, ForcePublishResult::AlreadyPublished { .. });
        prop_assert!(is_noop);
        prop_assert_eq!(store.branch_versions(&course).unwrap(), versions);
    }

    /// Dry runs never mutate; commits publish the draft and leave it alone.
    #[test]
    fn diverged_course(draft in version(), published in version()) {
        prop_assume!(draft != published);
        let store = MemoryStore::new();
        let course = CourseKey::parse("course-v1:e+d+X").unwrap();
        let before = BranchVersionMap::new(draft.clone(), published);
        store.insert_course(course.clone(), before.clone());

        let dry = run(&store, "course-v1:e+d+X", true);
        prop_assert_eq!(dry, ForcePublishResult::DryRun { current: before.clone() });
        prop_assert_eq!(store.branch_versions(&course).unwrap(), before.clone());

        let applied = run(&store, "course-v1:e+d+X", false);
        let after = store.branch_versions(&course).unwrap();
        prop_assert_eq!(&after.draft, &draft);
        prop_assert_eq!(&after.published, &draft);
        prop_assert_eq!(applied, ForcePublishResult::Applied { previous: before, updated: after });

        let repeat = run(&store, "course-v1:e+d+X", false);
        let is_noop = matches!(repeat, ForcePublishResult::AlreadyPublished { .. });
        prop_assert!(is_noop);
    }

    /// Legacy courses are refused whatever the mode.
    #[test]
    fn legacy_always_unsupported(
        org in component(),
        course in component(),
        run_id in component(),
        dry_run in any::<bool>(),
    ) {
        let text = format!("{}/{}/{}", org, course, run_id);
        let store = LegacyStore::in_memory([CourseKey::parse(&text).unwrap()]);

        let result = run(&store, &text, dry_run);
        let unsupported = matches!(
            result,
            ForcePublishResult::Failed(ForcePublishError::UnsupportedBackend(_))
        );
        prop_assert!(unsupported);
    }
}
