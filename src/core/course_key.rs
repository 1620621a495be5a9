//! core::course_key
//!
//! Course identity parsing and branch-qualified locators.
//!
//! # Textual Forms
//!
//! - `course-v1:ORG+COURSE+RUN` - versioned-style key, optionally followed
//!   by `+branch@<branch>` which is accepted and dropped
//! - `ORG/COURSE/RUN` - deprecated slash-separated key
//!
//! Each component must be non-empty and use only ASCII alphanumerics,
//! `_`, `-`, `~` and `.`.
//!
//! # Example
//!
//! ```
//! use coursekeeper::core::course_key::{CourseKey, KeyError};
//! use coursekeeper::core::types::Branch;
//!
//! let key = CourseKey::parse("course-v1:edX+DemoX+2024").unwrap();
//! assert_eq!(key.org(), "edX");
//! assert_eq!(
//!     key.for_branch(Branch::Draft).to_string(),
//!     "course-v1:edX+DemoX+2024+branch@draft-branch"
//! );
//!
//! assert_eq!(CourseKey::parse("  "), Err(KeyError::Empty));
//! assert!(matches!(CourseKey::parse("edx"), Err(KeyError::Malformed(_))));
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::types::Branch;

/// Prefix of versioned-style course keys.
pub const COURSE_KEY_PREFIX: &str = "course-v1:";

/// Errors from course key parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Input was empty or whitespace only.
    #[error("course key is empty")]
    Empty,

    /// Input does not match any accepted key form.
    #[error("malformed course key: {0}")]
    Malformed(String),
}

/// Which textual form a key was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// `course-v1:ORG+COURSE+RUN`
    Versioned,
    /// `ORG/COURSE/RUN`
    Deprecated,
}

/// An opaque, globally unique course identifier.
///
/// Immutable once parsed. The `Display` form is canonical and round-trips
/// through [`CourseKey::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey {
    org: String,
    course: String,
    run: String,
    style: KeyStyle,
}

impl CourseKey {
    /// Parse a course key from free text.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - [`KeyError::Empty`] if the text is empty or whitespace
    /// - [`KeyError::Malformed`] if the text matches no accepted form
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(KeyError::Empty);
        }

        if let Some(rest) = text.strip_prefix(COURSE_KEY_PREFIX) {
            let mut parts: Vec<&str> = rest.split('+').collect();
            if parts.len() == 4 {
                let branch = parts[3].strip_prefix("branch@").ok_or_else(|| {
                    KeyError::Malformed(format!("unexpected key segment '{}'", parts[3]))
                })?;
                Branch::parse(branch).map_err(|e| KeyError::Malformed(e.to_string()))?;
                parts.truncate(3);
            }
            return Self::from_parts(&parts, KeyStyle::Versioned);
        }

        if text.contains('/') {
            let parts: Vec<&str> = text.split('/').collect();
            return Self::from_parts(&parts, KeyStyle::Deprecated);
        }

        Err(KeyError::Malformed(format!(
            "'{}' is neither '{}ORG+COURSE+RUN' nor 'ORG/COURSE/RUN'",
            text, COURSE_KEY_PREFIX
        )))
    }

    fn from_parts(parts: &[&str], style: KeyStyle) -> Result<Self, KeyError> {
        let [org, course, run] = parts else {
            return Err(KeyError::Malformed(format!(
                "expected 3 key components, got {}",
                parts.len()
            )));
        };
        for component in [org, course, run] {
            Self::validate_component(component)?;
        }
        Ok(Self {
            org: org.to_string(),
            course: course.to_string(),
            run: run.to_string(),
            style,
        })
    }

    fn validate_component(component: &str) -> Result<(), KeyError> {
        if component.is_empty() {
            return Err(KeyError::Malformed("key component cannot be empty".into()));
        }
        if let Some(c) = component
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '~' | '.')))
        {
            return Err(KeyError::Malformed(format!(
                "key component cannot contain '{c}'"
            )));
        }
        Ok(())
    }

    /// Organization component.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Course component.
    pub fn course(&self) -> &str {
        &self.course
    }

    /// Run component.
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Textual form this key was parsed from.
    pub fn style(&self) -> KeyStyle {
        self.style
    }

    /// True for slash-separated keys.
    pub fn is_deprecated(&self) -> bool {
        self.style == KeyStyle::Deprecated
    }

    /// Derive the locator addressing one branch of this course.
    pub fn for_branch(&self, branch: Branch) -> BranchLocator {
        BranchLocator {
            course: self.clone(),
            branch,
        }
    }

    /// Stable hex digest of the canonical key, used for storage file names.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.to_string().as_bytes()))
    }
}

impl TryFrom<String> for CourseKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CourseKey> for String {
    fn from(key: CourseKey) -> Self {
        key.to_string()
    }
}

impl std::str::FromStr for CourseKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CourseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.style {
            KeyStyle::Versioned => write!(
                f,
                "{}{}+{}+{}",
                COURSE_KEY_PREFIX, self.org, self.course, self.run
            ),
            KeyStyle::Deprecated => write!(f, "{}/{}/{}", self.org, self.course, self.run),
        }
    }
}

/// A course key qualified with the branch to read or write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchLocator {
    course: CourseKey,
    branch: Branch,
}

impl BranchLocator {
    /// The unqualified course key.
    pub fn course(&self) -> &CourseKey {
        &self.course
    }

    /// The branch this locator addresses.
    pub fn branch(&self) -> Branch {
        self.branch
    }
}

impl std::fmt::Display for BranchLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Deprecated keys have no textual slot for a branch.
        match self.course.style {
            KeyStyle::Versioned => write!(f, "{}+branch@{}", self.course, self.branch),
            KeyStyle::Deprecated => write!(f, "{}", self.course),
        }
    }
}
