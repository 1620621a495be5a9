//! store::schema
//!
//! On-disk record schemas (v1) for the file-backed stores.
//!
//! # Schema Design
//!
//! Every record is:
//! - Self-describing with `kind` and `schema_version`
//! - Strictly parsed (unknown fields rejected)
//! - Validated against the file it was read from (the course or version it
//!   claims must match the one requested)
//!
//! # Example
//!
//! ```
//! use coursekeeper::core::course_key::CourseKey;
//! use coursekeeper::core::types::{Actor, BranchVersionMap, ContentVersion};
//! use coursekeeper::store::schema::{parse_record, CourseIndexV1};
//!
//! let course = CourseKey::parse("course-v1:e+d+X").unwrap();
//! let v0 = ContentVersion::new("000000000000000000000000").unwrap();
//! let index = CourseIndexV1::new(
//!     course,
//!     BranchVersionMap::new(v0.clone(), v0),
//!     Actor::new("staff").unwrap(),
//! );
//!
//! let json = serde_json::to_string(&index).unwrap();
//! let parsed: CourseIndexV1 = parse_record(&json).unwrap();
//! assert_eq!(parsed.versions, index.versions);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::course_key::CourseKey;
use crate::core::types::{Actor, BranchVersionMap, ContentVersion, UtcTimestamp};

/// Current schema version of every record kind.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from record parsing.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse record: {0}")]
    ParseError(String),

    #[error("invalid kind '{found}', expected '{expected}'")]
    InvalidKind {
        found: String,
        expected: &'static str,
    },

    #[error("unsupported schema version {0}, supported: {SCHEMA_VERSION}")]
    UnsupportedVersion(u32),
}

/// A record kind with a fixed `kind` identifier.
pub trait Record: Serialize + DeserializeOwned {
    /// Kind identifier written to every record of this type.
    const KIND: &'static str;
}

/// Envelope for version dispatch before full parsing.
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    kind: String,
    schema_version: u32,
}

/// Parse a record with kind and version checks.
///
/// # Errors
///
/// - [`SchemaError::ParseError`] for malformed JSON or unknown fields
/// - [`SchemaError::InvalidKind`] if the record is of another kind
/// - [`SchemaError::UnsupportedVersion`] for any version other than 1
pub fn parse_record<T: Record>(json: &str) -> Result<T, SchemaError> {
    let envelope: RecordEnvelope =
        serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;

    if envelope.kind != T::KIND {
        return Err(SchemaError::InvalidKind {
            found: envelope.kind,
            expected: T::KIND,
        });
    }

    match envelope.schema_version {
        SCHEMA_VERSION => {
            serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))
        }
        v => Err(SchemaError::UnsupportedVersion(v)),
    }
}

/// Branch pointer index for one versioned course (v1).
///
/// The only mutable record: force-publish rewrites it with a moved pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CourseIndexV1 {
    pub kind: String,
    pub schema_version: u32,
    pub course: CourseKey,
    pub versions: BranchVersionMap,
    pub edited_by: Actor,
    pub edited_on: UtcTimestamp,
}

impl CourseIndexV1 {
    /// Create an index stamped with the current time.
    pub fn new(course: CourseKey, versions: BranchVersionMap, edited_by: Actor) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            course,
            versions,
            edited_by,
            edited_on: UtcTimestamp::now(),
        }
    }
}

impl Record for CourseIndexV1 {
    const KIND: &'static str = "coursekeeper.course-index";
}

/// Immutable record of one content version (v1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructureV1 {
    pub kind: String,
    pub schema_version: u32,
    pub version: ContentVersion,
    pub course: CourseKey,
    /// Version this one was derived from; `None` for a course's first version.
    pub previous_version: Option<ContentVersion>,
    pub created_by: Actor,
    pub created_on: UtcTimestamp,
}

impl StructureV1 {
    /// Create a structure record stamped with the current time.
    pub fn new(
        version: ContentVersion,
        course: CourseKey,
        previous_version: Option<ContentVersion>,
        created_by: Actor,
    ) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            version,
            course,
            previous_version,
            created_by,
            created_on: UtcTimestamp::now(),
        }
    }
}

impl Record for StructureV1 {
    const KIND: &'static str = "coursekeeper.structure";
}

/// Registration of a course held by the legacy backend (v1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LegacyCourseV1 {
    pub kind: String,
    pub schema_version: u32,
    pub course: CourseKey,
    pub registered_by: Actor,
    pub registered_on: UtcTimestamp,
}

impl LegacyCourseV1 {
    /// Create a registration stamped with the current time.
    pub fn new(course: CourseKey, registered_by: Actor) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            course,
            registered_by,
            registered_on: UtcTimestamp::now(),
        }
    }
}

impl Record for LegacyCourseV1 {
    const KIND: &'static str = "coursekeeper.legacy-course";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> CourseKey {
        CourseKey::parse("course-v1:e+d+X").unwrap()
    }

    fn version(fill: char) -> ContentVersion {
        ContentVersion::new(fill.to_string().repeat(24)).unwrap()
    }

    fn staff() -> Actor {
        Actor::new("staff").unwrap()
    }

    #[test]
    fn index_roundtrip() {
        let index = CourseIndexV1::new(
            course(),
            BranchVersionMap::new(version('1'), version('0')),
            staff(),
        );
        assert_eq!(index.kind, CourseIndexV1::KIND);

        let json = serde_json::to_string(&index).unwrap();
        let parsed: CourseIndexV1 = parse_record(&json).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn structure_roundtrip() {
        let structure = StructureV1::new(version('1'), course(), Some(version('0')), staff());
        let json = serde_json::to_string(&structure).unwrap();
        let parsed: StructureV1 = parse_record(&json).unwrap();
        assert_eq!(parsed.previous_version, Some(version('0')));
    }

    #[test]
    fn wrong_kind_rejected() {
        let legacy = LegacyCourseV1::new(course(), staff());
        let json = serde_json::to_string(&legacy).unwrap();

        let err = parse_record::<CourseIndexV1>(&json).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKind { .. }));
        assert!(err.to_string().contains("coursekeeper.legacy-course"));
    }

    #[test]
    fn future_version_rejected() {
        let mut value = serde_json::to_value(LegacyCourseV1::new(course(), staff())).unwrap();
        value["schema_version"] = serde_json::json!(2);

        let err = parse_record::<LegacyCourseV1>(&value.to_string()).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedVersion(2)));
    }

    #[test]
    fn unknown_fields_rejected() {
        let mut value = serde_json::to_value(LegacyCourseV1::new(course(), staff())).unwrap();
        value["extra"] = serde_json::json!(true);

        let err = parse_record::<LegacyCourseV1>(&value.to_string()).unwrap_err();
        assert!(matches!(err, SchemaError::ParseError(_)));
    }

    #[test]
    fn invalid_version_value_rejected() {
        let mut value = serde_json::to_value(StructureV1::new(
            version('1'),
            course(),
            None,
            staff(),
        ))
        .unwrap();
        value["version"] = serde_json::json!("not-hex");

        assert!(parse_record::<StructureV1>(&value.to_string()).is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            parse_record::<CourseIndexV1>("{not json"),
            Err(SchemaError::ParseError(_))
        ));
    }
}
