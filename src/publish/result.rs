//! publish::result
//!
//! Outcomes of a force-publish invocation and their user-facing messages.

use thiserror::Error;

use crate::audit::Outcome;
use crate::core::course_key::CourseKey;
use crate::core::types::BranchVersionMap;
use crate::resolve::ResolveError;
use crate::store::StoreError;

/// Fixed user-facing message table.
pub mod messages {
    pub const EMPTY_COURSE_KEY: &str = "Please provide course id.";
    pub const INVALID_COURSE_KEY: &str = "Invalid course key.";
    pub const COURSE_KEY_NOT_FOUND: &str = "No matching course found.";
    pub const UNSUPPORTED_BACKEND: &str =
        "Force publish course does not support old mongo style courses.";
    pub const ALREADY_PUBLISHED: &str = "Course is already in published state.";
    pub const COULD_NOT_PUBLISH: &str = "Could not publish course.";
    pub const DRY_RUN: &str = "You have done a dry run of force publishing the course.";
    pub const APPLIED: &str = "Forced published the course.";
}

/// Why a force-publish invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForcePublishError {
    #[error("no course identity given")]
    EmptyIdentity,

    #[error("malformed course identity: {0}")]
    MalformedIdentity(String),

    #[error("course not found: {0}")]
    CourseNotFound(CourseKey),

    #[error("{0} is held by a backend without movable branch pointers")]
    UnsupportedBackend(CourseKey),

    /// The course changed between comparison and update: a pointer moved or
    /// the target version vanished. Retry the whole operation.
    #[error("course changed during publish: expected {expected}, found {actual}")]
    ConcurrentModification {
        expected: BranchVersionMap,
        actual: BranchVersionMap,
    },

    #[error("backend failure: {0}")]
    Backend(String),
}

impl ForcePublishError {
    /// User-facing message from the fixed table.
    pub fn message(&self) -> &'static str {
        match self {
            ForcePublishError::EmptyIdentity => messages::EMPTY_COURSE_KEY,
            ForcePublishError::MalformedIdentity(_) => messages::INVALID_COURSE_KEY,
            ForcePublishError::CourseNotFound(_) => messages::COURSE_KEY_NOT_FOUND,
            ForcePublishError::UnsupportedBackend(_) => messages::UNSUPPORTED_BACKEND,
            ForcePublishError::ConcurrentModification { .. } | ForcePublishError::Backend(_) => {
                messages::COULD_NOT_PUBLISH
            }
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            ForcePublishError::EmptyIdentity => Outcome::EmptyIdentity,
            ForcePublishError::MalformedIdentity(_) => Outcome::MalformedIdentity,
            ForcePublishError::CourseNotFound(_) => Outcome::CourseNotFound,
            ForcePublishError::UnsupportedBackend(_) => Outcome::UnsupportedBackend,
            ForcePublishError::ConcurrentModification { .. } => Outcome::ConcurrentModification,
            ForcePublishError::Backend(_) => Outcome::Backend,
        }
    }

    /// Whether re-running the operation may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ForcePublishError::ConcurrentModification { .. })
    }
}

impl From<ResolveError> for ForcePublishError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::EmptyIdentity => ForcePublishError::EmptyIdentity,
            ResolveError::MalformedIdentity(reason) => ForcePublishError::MalformedIdentity(reason),
            ResolveError::CourseNotFound(course) => ForcePublishError::CourseNotFound(course),
        }
    }
}

impl From<StoreError> for ForcePublishError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CourseNotFound(course) => ForcePublishError::CourseNotFound(course),
            StoreError::UnsupportedOperation(course) => {
                ForcePublishError::UnsupportedBackend(course)
            }
            StoreError::ConcurrentModification {
                expected, actual, ..
            } => ForcePublishError::ConcurrentModification { expected, actual },
            other => ForcePublishError::Backend(other.to_string()),
        }
    }
}

/// Result of one force-publish invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForcePublishResult {
    /// Both branches already point at the same version; nothing changed.
    AlreadyPublished { current: BranchVersionMap },
    /// Branches differ; dry run requested, nothing changed.
    DryRun { current: BranchVersionMap },
    /// The published pointer was moved to the draft version.
    Applied {
        previous: BranchVersionMap,
        updated: BranchVersionMap,
    },
    Failed(ForcePublishError),
}

impl ForcePublishResult {
    /// User-facing message from the fixed table.
    pub fn message(&self) -> &'static str {
        match self {
            ForcePublishResult::AlreadyPublished { .. } => messages::ALREADY_PUBLISHED,
            ForcePublishResult::DryRun { .. } => messages::DRY_RUN,
            ForcePublishResult::Applied { .. } => messages::APPLIED,
            ForcePublishResult::Failed(err) => err.message(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            ForcePublishResult::AlreadyPublished { .. } => Outcome::AlreadyPublished,
            ForcePublishResult::DryRun { .. } => Outcome::DryRun,
            ForcePublishResult::Applied { .. } => Outcome::Applied,
            ForcePublishResult::Failed(err) => err.outcome(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ForcePublishResult::Failed(_))
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&ForcePublishError> {
        match self {
            ForcePublishResult::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ContentVersion;

    fn course() -> CourseKey {
        CourseKey::parse("course-v1:e+d+X").unwrap()
    }

    fn v(fill: char) -> ContentVersion {
        ContentVersion::new(fill.to_string().repeat(24)).unwrap()
    }

    mod messages_table {
        use super::*;

        #[test]
        fn resolution_failures() {
            assert_eq!(
                ForcePublishError::EmptyIdentity.message(),
                "Please provide course id."
            );
            assert_eq!(
                ForcePublishError::MalformedIdentity("x".into()).message(),
                "Invalid course key."
            );
            assert_eq!(
                ForcePublishError::CourseNotFound(course()).message(),
                "No matching course found."
            );
        }

        #[test]
        fn publish_failures_share_one_message() {
            let map = BranchVersionMap::new(v('1'), v('0'));
            for err in [
                ForcePublishError::ConcurrentModification {
                    expected: map.clone(),
                    actual: map,
                },
                ForcePublishError::Backend("disk full".into()),
            ] {
                assert_eq!(err.message(), "Could not publish course.");
            }
        }

        #[test]
        fn terminal_states() {
            let map = BranchVersionMap::new(v('1'), v('1'));
            assert_eq!(
                ForcePublishResult::AlreadyPublished {
                    current: map.clone()
                }
                .message(),
                "Course is already in published state."
            );
            assert_eq!(
                ForcePublishResult::Failed(ForcePublishError::UnsupportedBackend(course()))
                    .message(),
                "Force publish course does not support old mongo style courses."
            );
            assert!(ForcePublishResult::DryRun {
                current: map.clone()
            }
            .message()
            .contains("dry run"));
            assert!(ForcePublishResult::Applied {
                previous: map.clone(),
                updated: map
            }
            .message()
            .starts_with("Forced published"));
        }
    }

    mod conversions {
        use super::*;

        #[test]
        fn from_resolve_error() {
            assert_eq!(
                ForcePublishError::from(ResolveError::EmptyIdentity),
                ForcePublishError::EmptyIdentity
            );
            assert!(matches!(
                ForcePublishError::from(ResolveError::CourseNotFound(course())),
                ForcePublishError::CourseNotFound(_)
            ));
        }

        #[test]
        fn from_store_error() {
            assert!(matches!(
                ForcePublishError::from(StoreError::UnsupportedOperation(course())),
                ForcePublishError::UnsupportedBackend(_)
            ));
            // Outside the move step a missing version is a store fault.
            assert!(matches!(
                ForcePublishError::from(StoreError::VersionNotFound(v('1'))),
                ForcePublishError::Backend(_)
            ));

            let io = StoreError::Io {
                path: "/store/x.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
            };
            match ForcePublishError::from(io) {
                ForcePublishError::Backend(detail) => assert!(detail.contains("boom")),
                other => panic!("expected Backend, got {:?}", other),
            }
        }

        #[test]
        fn only_concurrent_modification_is_retryable() {
            let map = BranchVersionMap::new(v('1'), v('0'));
            assert!(ForcePublishError::ConcurrentModification {
                expected: map.clone(),
                actual: map
            }
            .is_retryable());
            assert!(!ForcePublishError::Backend("disk full".into()).is_retryable());
        }
    }

    #[test]
    fn outcome_tags() {
        assert_eq!(
            ForcePublishResult::Failed(ForcePublishError::EmptyIdentity).outcome(),
            Outcome::EmptyIdentity
        );
        let map = BranchVersionMap::new(v('1'), v('1'));
        let result = ForcePublishResult::AlreadyPublished { current: map };
        assert_eq!(result.outcome(), Outcome::AlreadyPublished);
        assert!(!result.is_failure());
        assert!(result.error().is_none());
    }
}
