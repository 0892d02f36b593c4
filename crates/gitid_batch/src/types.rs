//! Input and result types for batch identifier runs.

use gitid_identifier::{IdentifierOptions, IdentifierResult};
use gitid_meta::NormalizedMetadata;
use serde::{Deserialize, Serialize};

use crate::BatchError;

/// Branch assumed for remote inputs that omit one.
pub const DEFAULT_BRANCH: &str = "main";

/// One unit of batch work, discriminated by which adapter serves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BatchInput {
    /// Resolve metadata from a local working copy.
    #[serde(rename = "local", rename_all = "camelCase")]
    Local { repo_path: String, file_path: String },

    /// Resolve metadata from the hosting provider's API.
    #[serde(rename = "github", rename_all = "camelCase")]
    Remote {
        owner: String,
        repo: String,
        file_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
}

impl BatchInput {
    /// Path this input identifies; also the label used in results.
    pub fn file_path(&self) -> &str {
        match self {
            BatchInput::Local { file_path, .. } | BatchInput::Remote { file_path, .. } => file_path,
        }
    }

    /// Branch for remote inputs, with the default applied.
    pub fn branch(&self) -> &str {
        match self {
            BatchInput::Remote { branch, .. } => branch.as_deref().unwrap_or(DEFAULT_BRANCH),
            BatchInput::Local { .. } => DEFAULT_BRANCH,
        }
    }

    /// Checks the discriminator-specific required fields. Runs before any
    /// work is scheduled so a malformed input rejects the whole batch
    /// instead of burning adapter calls.
    pub fn validate(&self) -> Result<(), BatchError> {
        match self {
            BatchInput::Local {
                repo_path,
                file_path,
            } => {
                require(repo_path, "local input requires repoPath")?;
                require(file_path, "local input requires filePath")?;
            }
            BatchInput::Remote {
                owner,
                repo,
                file_path,
                ..
            } => {
                require(owner, "github input requires owner")?;
                require(repo, "github input requires repo")?;
                require(file_path, "github input requires filePath")?;
            }
        }
        Ok(())
    }
}

fn require(value: &str, message: &str) -> Result<(), BatchError> {
    if value.trim().is_empty() {
        Err(BatchError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

/// Item status within a batch result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Error,
}

/// Outcome of one batch item.
///
/// Exactly one of the success shape (`identifier` set, `status: success`)
/// or the error shape (`status: error`, `error` set, `identifier` absent)
/// holds; the constructors enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub file_path: String,
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    pub status: BatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NormalizedMetadata>,
}

impl BatchItemResult {
    pub fn success(file_path: String, result: IdentifierResult) -> Self {
        Self {
            file_path,
            identifier: Some(result.identifier),
            short: Some(result.short),
            status: BatchStatus::Success,
            error: None,
            metadata: result.metadata,
        }
    }

    pub fn failure(file_path: String, error: String) -> Self {
        Self {
            file_path,
            identifier: None,
            short: None,
            status: BatchStatus::Error,
            error: Some(error),
            metadata: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Success
    }
}

/// Options for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of in-flight item computations.
    pub concurrency: usize,
    /// Capture per-item failures instead of aborting the run.
    pub continue_on_error: bool,
    /// Options forwarded to identifier generation for every item.
    pub identifier: IdentifierOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            continue_on_error: true,
            identifier: IdentifierOptions::default(),
        }
    }
}
