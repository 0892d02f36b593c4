//! Metadata normalization: the boundary where untrusted producer records
//! become canonical [`NormalizedMetadata`] values.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::MetadataError;
use crate::hash::validate_hash;
use crate::path::normalize_file_path;
use crate::types::{NormalizedMetadata, RawMetadata};

/// Normalizes a raw metadata record into the canonical shape.
///
/// Pure and free of I/O. Required fields are checked for presence, digests
/// are validated and lower-cased, the file path is forced to POSIX form,
/// and `lastModified` (when present) is reformatted as an ISO-8601 UTC
/// string. Empty optional fields are dropped, so field-wise equal inputs
/// always produce identical records regardless of key order, whitespace,
/// or platform path separators.
pub fn normalize(raw: &RawMetadata) -> Result<NormalizedMetadata, MetadataError> {
    match normalize_inner(raw) {
        Ok(meta) => Ok(meta),
        Err(err) => {
            warn!(error = %err, "metadata_normalize_failure");
            Err(err)
        }
    }
}

fn normalize_inner(raw: &RawMetadata) -> Result<NormalizedMetadata, MetadataError> {
    let source = raw.source.ok_or(MetadataError::MissingField("source"))?;
    let owner = required(&raw.owner, "owner")?;
    let repo = required(&raw.repo, "repo")?;
    let branch = required(&raw.branch, "branch")?;
    let commit_hash = required(&raw.commit_hash, "commitHash")?;
    let file_path = required(&raw.file_path, "filePath")?;
    let file_hash = required(&raw.file_hash, "fileHash")?;

    validate_hash(&commit_hash, "commitHash")?;
    validate_hash(&file_hash, "fileHash")?;

    let file_path = normalize_file_path(&file_path);
    // A path like "./" normalizes away entirely; treat that as absent.
    if file_path.is_empty() {
        return Err(MetadataError::MissingField("filePath"));
    }

    let last_modified = match optional(&raw.last_modified) {
        Some(value) => Some(normalize_timestamp(value)?),
        None => None,
    };

    Ok(NormalizedMetadata {
        source,
        owner,
        repo,
        branch,
        commit_hash: commit_hash.to_ascii_lowercase(),
        file_path,
        file_hash: file_hash.to_ascii_lowercase(),
        last_modified,
        html_url: optional(&raw.html_url).map(str::to_string),
        repo_path: optional(&raw.repo_path).map(str::to_string),
    })
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, MetadataError> {
    optional(value)
        .map(str::to_string)
        .ok_or(MetadataError::MissingField(field))
}

/// Whitespace-only strings count as absent.
fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Reformats a producer timestamp as `%Y-%m-%dT%H:%M:%SZ` in UTC.
///
/// Accepts RFC 3339 (offset or `Z`) plus the bare `YYYY-MM-DDTHH:MM:SS`
/// and `YYYY-MM-DD HH:MM:SS` forms, which are taken as already-UTC.
/// Anything else is a hard error, never a silent pass-through.
pub fn normalize_timestamp(value: &str) -> Result<String, MetadataError> {
    let trimmed = value.trim();
    let utc = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive_utc(trimmed))
        .ok_or_else(|| MetadataError::InvalidTimestamp(value.to_string()))?;
    Ok(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn parse_naive_utc(value: &str) -> Option<DateTime<Utc>> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    None
}
