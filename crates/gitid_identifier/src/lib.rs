//! Identifier generation for Git-derived file metadata.
//!
//! This crate turns a normalized metadata record into a deterministic,
//! content-sensitive identifier. The record is serialized canonically
//! (sorted keys, no whitespace), the canonical UTF-8 bytes are hashed with
//! the configured algorithm, and the digest is packaged as
//! `"<algorithm>:<digest>"` together with a fixed-length short form.
//!
//! Identical normalized metadata under identical options always yields
//! byte-identical output, on any platform, for any run.
//!
//! ```
//! use gitid_identifier::{generate, IdentifierOptions};
//! use gitid_meta::{MetadataSource, RawMetadata};
//!
//! let raw = RawMetadata {
//!     source: Some(MetadataSource::LocalGit),
//!     owner: Some("octocat".into()),
//!     repo: Some("hello-world".into()),
//!     branch: Some("main".into()),
//!     commit_hash: Some("abc123def4567890abc123def4567890abc123de".into()),
//!     file_path: Some("src/lib.rs".into()),
//!     file_hash: Some("def456abc7890123def456abc7890123def456ab".into()),
//!     ..Default::default()
//! };
//!
//! let result = generate(&raw, &IdentifierOptions::default()).expect("valid metadata");
//! assert!(result.identifier.starts_with("sha256:"));
//! assert_eq!(result.short.len(), 8);
//! ```

mod canonical;
mod digest;

pub use canonical::{canonical_json, canonical_string};
pub use digest::{encode_digest, Algorithm, DigestEncoding};

use gitid_meta::{normalize, MetadataError, NormalizedMetadata, RawMetadata};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters of the full digest exposed as the human-short form.
pub const SHORT_LEN: usize = 8;

/// Errors that can occur during identifier generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("invalid identifier options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Options controlling identifier generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentifierOptions {
    pub algorithm: Algorithm,
    pub encoding: DigestEncoding,
    /// Keep only the first N characters of the encoded digest in the
    /// identifier. The short form is always computed from the full digest.
    pub truncate: Option<usize>,
    /// Attach the normalized record to the result.
    pub include_metadata: bool,
}

impl Default for IdentifierOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            encoding: DigestEncoding::Hex,
            truncate: None,
            include_metadata: false,
        }
    }
}

/// A generated identifier. Created once per [`generate`] call, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentifierResult {
    /// `"<algorithm>:<digest>"`, with the digest truncated when requested.
    pub identifier: String,
    /// First eight characters of the untruncated digest.
    pub short: String,
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NormalizedMetadata>,
}

/// Generates a deterministic identifier for one metadata record.
///
/// The normalizer runs even on already-normalized input (normalization is
/// idempotent), so raw and normalized records hash identically. Option
/// validation happens before any computation.
pub fn generate(
    raw: &RawMetadata,
    options: &IdentifierOptions,
) -> Result<IdentifierResult, IdentifierError> {
    validate_options(options)?;
    let normalized = normalize(raw)?;
    Ok(generate_unchecked(normalized, options))
}

/// Variant of [`generate`] for callers already holding a normalized record.
pub fn generate_normalized(
    meta: &NormalizedMetadata,
    options: &IdentifierOptions,
) -> Result<IdentifierResult, IdentifierError> {
    generate(&RawMetadata::from(meta), options)
}

/// Maps [`generate`] over a sequence. No state is shared between elements;
/// the first failure propagates. Partial-failure resilience belongs to the
/// batch orchestrator, not here.
pub fn generate_many(
    records: &[RawMetadata],
    options: &IdentifierOptions,
) -> Result<Vec<IdentifierResult>, IdentifierError> {
    records.iter().map(|raw| generate(raw, options)).collect()
}

fn validate_options(options: &IdentifierOptions) -> Result<(), IdentifierError> {
    if options.truncate == Some(0) {
        return Err(IdentifierError::InvalidOptions(
            "truncate must keep at least one digest character".to_string(),
        ));
    }
    Ok(())
}

fn generate_unchecked(
    normalized: NormalizedMetadata,
    options: &IdentifierOptions,
) -> IdentifierResult {
    let canonical = canonical_string(&normalized);
    let digest = encode_digest(options.algorithm, options.encoding, canonical.as_bytes());

    // Digests are ASCII under both encodings, so char counts are lengths.
    let short: String = digest.chars().take(SHORT_LEN).collect();
    let kept = match options.truncate {
        Some(limit) if limit < digest.len() => digest[..limit].to_string(),
        _ => digest.clone(),
    };

    IdentifierResult {
        identifier: format!("{}:{}", options.algorithm, kept),
        short,
        algorithm: options.algorithm,
        metadata: options.include_metadata.then_some(normalized),
    }
}
