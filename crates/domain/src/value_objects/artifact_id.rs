//! Opaque identifier for synthesized audio artifacts

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Opaque identifier handed to clients in place of a storage location
///
/// Only the canonical hyphenated UUID form is accepted when parsing, so an
/// identifier can never carry path separators or relative components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Create a new random artifact ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an artifact ID from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an artifact ID from its hyphenated string form
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        // Uuid::parse_str also takes simple, braced and urn forms
        if s.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(DomainError::not_found("Artifact", s));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::not_found("Artifact", s))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// File name used when the artifact is stored on disk
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0.hyphenated())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for ArtifactId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_artifact_id_is_unique() {
        let id1 = ArtifactId::new();
        let id2 = ArtifactId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn artifact_id_roundtrips_through_string() {
        let original = ArtifactId::new();
        let parsed = ArtifactId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn from_uuid_trait() {
        let uuid = Uuid::new_v4();
        let id: ArtifactId = uuid.into();
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn display_format() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = ArtifactId::from_uuid(uuid);
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ArtifactId::parse("not-a-uuid").is_err());
        assert!(ArtifactId::parse("").is_err());
    }

    #[test]
    fn parse_rejects_path_traversal() {
        assert!(ArtifactId::parse("../../etc/passwd").is_err());
        assert!(ArtifactId::parse("/tmp/lingotutor/reply.mp3").is_err());
    }

    #[test]
    fn parse_rejects_non_hyphenated_forms() {
        assert!(ArtifactId::parse("550e8400e29b41d4a716446655440000").is_err());
        assert!(ArtifactId::parse("{550e8400-e29b-41d4-a716-446655440000}").is_err());
        assert!(ArtifactId::parse("urn:uuid:550e8400-e29b-41d4-a716-446655440000").is_err());
    }

    #[test]
    fn parse_error_is_not_found() {
        let err = ArtifactId::parse("nope").unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn file_name_appends_extension() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = ArtifactId::from_uuid(uuid);
        assert_eq!(id.file_name("mp3"), "550e8400-e29b-41d4-a716-446655440000.mp3");
    }

    #[test]
    fn serialization() {
        let id = ArtifactId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ArtifactId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
