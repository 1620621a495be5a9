//! resolve
//!
//! Turns operator-supplied course text into a course the store holds.
//!
//! # Example
//!
//! ```
//! use coursekeeper::core::types::{Actor, Branch};
//! use coursekeeper::resolve::{BranchResolver, ResolveError};
//! use coursekeeper::store::{DraftAuthoring, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let resolver = BranchResolver::new(&store);
//!
//! assert!(matches!(resolver.resolve("  "), Err(ResolveError::EmptyIdentity)));
//! assert!(matches!(resolver.resolve("edx"), Err(ResolveError::MalformedIdentity(_))));
//!
//! let course = "course-v1:e+d+X".parse().unwrap();
//! store.create_course(&course, &Actor::new("staff").unwrap()).unwrap();
//! let resolved = resolver.resolve("course-v1:e+d+X").unwrap();
//! assert_eq!(
//!     BranchResolver::for_branch(&resolved, Branch::Draft).to_string(),
//!     "course-v1:e+d+X+branch@draft-branch"
//! );
//! ```

use thiserror::Error;

use crate::core::course_key::{BranchLocator, CourseKey, KeyError};
use crate::core::types::Branch;
use crate::store::VersionStore;

/// Errors from course resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No course text was given.
    #[error("no course identity given")]
    EmptyIdentity,

    /// The text is not a course key.
    #[error("malformed course identity: {0}")]
    MalformedIdentity(String),

    /// The key is well formed but no backend holds it.
    #[error("course not found: {0}")]
    CourseNotFound(CourseKey),
}

impl From<KeyError> for ResolveError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Empty => ResolveError::EmptyIdentity,
            KeyError::Malformed(reason) => ResolveError::MalformedIdentity(reason),
        }
    }
}

/// Resolves course text against a store.
#[derive(Clone, Copy)]
pub struct BranchResolver<'a> {
    store: &'a dyn VersionStore,
}

impl<'a> BranchResolver<'a> {
    /// Create a resolver over `store`.
    pub fn new(store: &'a dyn VersionStore) -> Self {
        Self { store }
    }

    /// Parse `text` and confirm the course exists.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::EmptyIdentity`] for empty or whitespace-only text
    /// - [`ResolveError::MalformedIdentity`] if the text is not a course key
    /// - [`ResolveError::CourseNotFound`] if no backend holds the course
    pub fn resolve(&self, text: &str) -> Result<CourseKey, ResolveError> {
        let course = CourseKey::parse(text)?;
        if !self.store.has_course(&course) {
            return Err(ResolveError::CourseNotFound(course));
        }
        Ok(course)
    }

    /// Branch-qualified locator for reads and writes of one branch.
    pub fn for_branch(course: &CourseKey, branch: Branch) -> BranchLocator {
        course.for_branch(branch)
    }
}
