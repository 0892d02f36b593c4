//! Core data model for Git-derived file metadata.
//!
//! [`RawMetadata`] is the untrusted producer shape: every field is optional
//! at the type level so presence is checked at the normalizer boundary,
//! where a missing required field becomes a hard error naming the field.
//! [`NormalizedMetadata`] is the canonical record downstream stages rely on.

use serde::{Deserialize, Serialize};

/// Producer that supplied a raw metadata record.
///
/// The wire values participate in the canonical serialization, so they are
/// part of the identifier itself and must never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetadataSource {
    /// Metadata extracted from a local working copy.
    #[serde(rename = "local-git")]
    LocalGit,
    /// Metadata fetched from the hosting provider's REST API.
    #[serde(rename = "github-api")]
    GithubApi,
}

impl MetadataSource {
    /// Wire value used in the canonical serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataSource::LocalGit => "local-git",
            MetadataSource::GithubApi => "github-api",
        }
    }
}

/// Untrusted metadata as produced by an adapter.
///
/// Whitespace-only strings count as absent during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetadata {
    pub source: Option<MetadataSource>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    pub file_path: Option<String>,
    pub file_hash: Option<String>,
    pub last_modified: Option<String>,
    pub html_url: Option<String>,
    pub repo_path: Option<String>,
}

/// Canonical metadata record produced by [`normalize`](crate::normalize).
///
/// An independently owned, immutable value: nothing aliases back to the raw
/// input. Two raw records that are field-wise equal after normalization
/// yield byte-identical canonical serializations of this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetadata {
    pub source: MetadataSource,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Lower-case 40-hex commit digest.
    pub commit_hash: String,
    /// Forward-slash path with no leading `./`, duplicate or trailing slashes.
    pub file_path: String,
    /// Lower-case 40-hex blob digest.
    pub file_hash: String,
    /// ISO-8601 UTC timestamp, when the producer supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
}

impl From<&NormalizedMetadata> for RawMetadata {
    /// Lets callers feed an already-normalized record back through the
    /// pipeline; normalization is idempotent over this conversion.
    fn from(meta: &NormalizedMetadata) -> Self {
        RawMetadata {
            source: Some(meta.source),
            owner: Some(meta.owner.clone()),
            repo: Some(meta.repo.clone()),
            branch: Some(meta.branch.clone()),
            commit_hash: Some(meta.commit_hash.clone()),
            file_path: Some(meta.file_path.clone()),
            file_hash: Some(meta.file_hash.clone()),
            last_modified: meta.last_modified.clone(),
            html_url: meta.html_url.clone(),
            repo_path: meta.repo_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_to_wire_values() {
        assert_eq!(
            serde_json::to_string(&MetadataSource::LocalGit).expect("serialize"),
            "\"local-git\"",
        );
        assert_eq!(
            serde_json::to_string(&MetadataSource::GithubApi).expect("serialize"),
            "\"github-api\"",
        );
    }

    #[test]
    fn raw_metadata_deserializes_camel_case_with_missing_fields() {
        let raw: RawMetadata = serde_json::from_str(
            r#"{"source":"local-git","commitHash":"abc","filePath":"src/a.rs"}"#,
        )
        .expect("deserialize");

        assert_eq!(raw.source, Some(MetadataSource::LocalGit));
        assert_eq!(raw.commit_hash.as_deref(), Some("abc"));
        assert_eq!(raw.file_path.as_deref(), Some("src/a.rs"));
        assert!(raw.owner.is_none());
        assert!(raw.html_url.is_none());
    }
}
