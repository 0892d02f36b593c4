//! Contract for the out-of-scope metadata adapters.
//!
//! The engine never inspects how a record was obtained; it only consumes
//! [`RawMetadata`] produced by one of these two entry points. Timeouts and
//! retries are the adapter's business, not the orchestrator's.

use async_trait::async_trait;
use gitid_meta::RawMetadata;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures an adapter may surface.
///
/// `NotFound`, `RateLimited` and `AuthFailed` pass through the engine
/// unmodified (no retry, no backoff); anything else arrives as `Adapter`
/// and is wrapped with operation and file-path context at the batch
/// boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The path has no version-control history or the resource is absent.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// The hosting API quota is exhausted. Caller-visible; the engine does
    /// not retry.
    #[error("rate limited by the hosting API")]
    RateLimited,

    /// The credential was rejected or missing.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Any other adapter failure (subprocess, network, malformed response).
    #[error("adapter failure: {0}")]
    Adapter(String),
}

/// Source of raw metadata records, implemented by out-of-scope
/// collaborators: a subprocess-driven local adapter or an HTTP client for
/// the hosting API. Both produce the same record shape; the remote side
/// may additionally fill the permalink field.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Metadata for a file tracked in a local working copy rooted at
    /// `repo_root`. Must fail with [`FetchError::NotFound`] when the path
    /// has no version-control history.
    async fn local_metadata(
        &self,
        repo_root: &str,
        file_path: &str,
    ) -> Result<RawMetadata, FetchError>;

    /// Metadata for a file on the hosting provider at `reference`.
    async fn remote_metadata(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
        reference: &str,
    ) -> Result<RawMetadata, FetchError>;
}

/// Construction-time settings for remote adapters.
///
/// Credentials travel here explicitly; the engine never reads the process
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Hosting domain used for API calls and permalinks.
    pub host: String,
    /// Access token, when the deployment requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            token: None,
        }
    }
}
