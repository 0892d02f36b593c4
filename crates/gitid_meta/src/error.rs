//! Error surface for metadata validation and normalization.

use thiserror::Error;

/// Errors raised while validating or normalizing a raw metadata record.
/// All variants are local validation failures: they are never retried and
/// always surface to the immediate caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A field the canonical record cannot exist without was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A commit or blob digest was not a 40-character hexadecimal string.
    #[error("invalid {field}: {hash:?} is not a 40-character hex digest")]
    InvalidHash {
        /// Wire name of the offending field (`commitHash` or `fileHash`).
        field: &'static str,
        /// The rejected value, verbatim.
        hash: String,
    },

    /// `lastModified` could not be parsed as a timestamp.
    #[error("invalid lastModified timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A Git remote URL did not match any supported format.
    #[error("unsupported remote url: {0:?}")]
    InvalidRemoteUrl(String),
}
