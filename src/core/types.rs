//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Branch`] - The two movable branch pointers of a course
//! - [`ContentVersion`] - Immutable content snapshot identifier
//! - [`BranchVersionMap`] - Point-in-time snapshot of both branch pointers
//! - [`Actor`] - Identity of the operator performing an action
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use coursekeeper::core::types::{Branch, ContentVersion};
//!
//! let version = ContentVersion::new("5f3a9c0e1b2d4c6e8f0a1b2c").unwrap();
//! assert_eq!(version.short(7), "5f3a9c0");
//! assert_eq!(Branch::Published.as_str(), "published-branch");
//!
//! assert!(ContentVersion::new("not-a-version").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid content version: {0}")]
    InvalidVersion(String),

    #[error("invalid branch: {0}")]
    InvalidBranch(String),

    #[error("invalid actor: {0}")]
    InvalidActor(String),
}

/// A named, independently movable pointer to a content version.
///
/// Serialized with the names the versioned store uses on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Branch {
    /// Work-in-progress content edited by authors.
    #[serde(rename = "draft-branch")]
    Draft,
    /// Content visible to learners.
    #[serde(rename = "published-branch")]
    Published,
}

impl Branch {
    /// Both branches, draft first.
    pub const ALL: [Branch; 2] = [Branch::Draft, Branch::Published];

    /// Get the stored branch name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Draft => "draft-branch",
            Branch::Published => "published-branch",
        }
    }

    /// Parse a stored branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranch` for anything other than the two
    /// stored names.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        match name {
            "draft-branch" => Ok(Branch::Draft),
            "published-branch" => Ok(Branch::Published),
            other => Err(TypeError::InvalidBranch(other.to_string())),
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable content version identifier.
///
/// Versions are lowercase hex: 24 characters for object ids issued by the
/// authoring system, 40 or 64 for content hashes. Versions are never
/// mutated; only branch pointers move between them.
///
/// # Example
///
/// ```
/// use coursekeeper::core::types::ContentVersion;
///
/// // Normalized to lowercase
/// let v = ContentVersion::new("5F3A9C0E1B2D4C6E8F0A1B2C").unwrap();
/// assert_eq!(v.as_str(), "5f3a9c0e1b2d4c6e8f0a1b2c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentVersion(String);

impl ContentVersion {
    /// Create a new validated content version.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` if the string is not 24, 40 or 64
    /// hex characters.
    pub fn new(version: impl Into<String>) -> Result<Self, TypeError> {
        let version = version.into().to_ascii_lowercase();
        Self::validate(&version)?;
        Ok(Self(version))
    }

    /// Derive the version of a content snapshot.
    ///
    /// The hash covers the parent version (if any) and the content bytes, so
    /// identical content staged on different parents yields distinct versions.
    pub fn derive(parent: Option<&ContentVersion>, content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        if let Some(parent) = parent {
            hasher.update(parent.as_str().as_bytes());
        }
        hasher.update(b"\0");
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Get an abbreviated form of the version.
    ///
    /// Returns the first `len` characters, or the full version if shorter.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(version: &str) -> Result<(), TypeError> {
        if !matches!(version.len(), 24 | 40 | 64) {
            return Err(TypeError::InvalidVersion(format!(
                "expected 24, 40 or 64 hex characters, got {}",
                version.len()
            )));
        }
        if !version.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidVersion(
                "content version must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentVersion {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentVersion> for String {
    fn from(version: ContentVersion) -> Self {
        version.0
    }
}

impl AsRef<str> for ContentVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time snapshot of a course's two branch pointers.
///
/// Derived fresh from the store on every read. Two maps for the same course
/// taken at different times compare per branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchVersionMap {
    #[serde(rename = "draft-branch")]
    pub draft: ContentVersion,
    #[serde(rename = "published-branch")]
    pub published: ContentVersion,
}

impl BranchVersionMap {
    /// Create a snapshot from both pointers.
    pub fn new(draft: ContentVersion, published: ContentVersion) -> Self {
        Self { draft, published }
    }

    /// Get the version a branch points to.
    pub fn get(&self, branch: Branch) -> &ContentVersion {
        match branch {
            Branch::Draft => &self.draft,
            Branch::Published => &self.published,
        }
    }

    /// Return a copy with `branch` repointed to `version`.
    pub fn with(&self, branch: Branch, version: ContentVersion) -> Self {
        let mut next = self.clone();
        match branch {
            Branch::Draft => next.draft = version,
            Branch::Published => next.published = version,
        }
        next
    }

    /// True when published already matches draft.
    pub fn is_published(&self) -> bool {
        self.draft == self.published
    }
}

impl std::fmt::Display for BranchVersionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}={}, {}={}",
            Branch::Draft,
            self.draft,
            Branch::Published,
            self.published
        )
    }
}

/// Identity of the operator performing an action.
///
/// Used for audit records and the `edited_by` field of the course index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

impl Actor {
    /// Create a validated actor identity.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidActor` if the name is empty, padded with
    /// whitespace, or contains control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidActor("actor cannot be empty".into()));
        }
        if name.trim() != name {
            return Err(TypeError::InvalidActor(
                "actor cannot start or end with whitespace".into(),
            ));
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidActor(
                "actor cannot contain control characters".into(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the actor name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Actor {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ContentVersion {
        ContentVersion::new(s).unwrap()
    }

    mod branch {
        use super::*;

        #[test]
        fn stored_names() {
            assert_eq!(Branch::Draft.as_str(), "draft-branch");
            assert_eq!(Branch::Published.as_str(), "published-branch");
        }

        #[test]
        fn parse_known_names() {
            assert_eq!(Branch::parse("draft-branch"), Ok(Branch::Draft));
            assert_eq!(Branch::parse("published-branch"), Ok(Branch::Published));
        }

        #[test]
        fn parse_rejects_unknown() {
            assert!(Branch::parse("draft").is_err());
            assert!(Branch::parse("").is_err());
        }

        #[test]
        fn serde_uses_stored_names() {
            let json = serde_json::to_string(&Branch::Published).unwrap();
            assert_eq!(json, "\"published-branch\"");
        }
    }

    mod content_version {
        use super::*;

        #[test]
        fn accepts_object_id_and_hashes() {
            assert!(ContentVersion::new("5f3a9c0e1b2d4c6e8f0a1b2c").is_ok());
            assert!(ContentVersion::new("abc123def4567890abc123def4567890abc12345").is_ok());
            assert!(ContentVersion::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            assert_eq!(
                v("5F3A9C0E1B2D4C6E8F0A1B2C").as_str(),
                "5f3a9c0e1b2d4c6e8f0a1b2c"
            );
        }

        #[test]
        fn invalid_length() {
            assert!(ContentVersion::new("").is_err());
            assert!(ContentVersion::new("abc123").is_err());
            assert!(ContentVersion::new("a".repeat(25)).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(ContentVersion::new("xyz39c0e1b2d4c6e8f0a1b2c").is_err());
        }

        #[test]
        fn derive_depends_on_parent_and_content() {
            let parent = v("5f3a9c0e1b2d4c6e8f0a1b2c");
            let a = ContentVersion::derive(Some(&parent), b"chapter one");
            let b = ContentVersion::derive(Some(&parent), b"chapter two");
            let c = ContentVersion::derive(None, b"chapter one");

            assert_eq!(a.as_str().len(), 64);
            assert_ne!(a, b);
            assert_ne!(a, c);
            assert_eq!(a, ContentVersion::derive(Some(&parent), b"chapter one"));
        }

        #[test]
        fn short_form() {
            let version = v("5f3a9c0e1b2d4c6e8f0a1b2c");
            assert_eq!(version.short(7), "5f3a9c0");
            assert_eq!(version.short(100), version.as_str());
        }

        #[test]
        fn serde_rejects_invalid() {
            assert!(serde_json::from_str::<ContentVersion>("\"nope\"").is_err());
        }
    }

    mod branch_version_map {
        use super::*;

        #[test]
        fn get_and_with() {
            let draft = v("111111111111111111111111");
            let published = v("000000000000000000000000");
            let map = BranchVersionMap::new(draft.clone(), published.clone());

            assert_eq!(map.get(Branch::Draft), &draft);
            assert_eq!(map.get(Branch::Published), &published);
            assert!(!map.is_published());

            let moved = map.with(Branch::Published, draft.clone());
            assert_eq!(moved.published, draft);
            assert!(moved.is_published());
            // Original untouched
            assert_eq!(map.published, published);
        }

        #[test]
        fn serializes_with_branch_names() {
            let map = BranchVersionMap::new(
                v("111111111111111111111111"),
                v("000000000000000000000000"),
            );
            let json = serde_json::to_value(&map).unwrap();
            assert_eq!(json["draft-branch"], "111111111111111111111111");
            assert_eq!(json["published-branch"], "000000000000000000000000");
        }
    }

    mod actor {
        use super::*;

        #[test]
        fn valid_actor() {
            assert_eq!(Actor::new("staff").unwrap().as_str(), "staff");
            assert!(Actor::new("jane.doe@example.com").is_ok());
        }

        #[test]
        fn invalid_actor() {
            assert!(Actor::new("").is_err());
            assert!(Actor::new(" staff").is_err());
            assert!(Actor::new("sta\nff").is_err());
        }
    }

    mod utc_timestamp {
        use super::*;

        #[test]
        fn now_works() {
            let ts = UtcTimestamp::now();
            assert!(ts.to_string().contains('T'));
        }

        #[test]
        fn serde_roundtrip() {
            let ts = UtcTimestamp::now();
            let json = serde_json::to_string(&ts).unwrap();
            let parsed: UtcTimestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(ts, parsed);
        }
    }
}
