//! Remote URL parsing and permalink construction.

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::path::normalize_file_path;

/// Hosting coordinates parsed from a Git remote URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteRepo {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

/// Parses an SSH (`git@host:owner/repo.git`) or HTTP(S)
/// (`https://host/owner/repo.git`) remote into its hosting coordinates.
pub fn parse_remote_url(remote_url: &str) -> Result<RemoteRepo, MetadataError> {
    let url = remote_url.trim();

    if let Some(rest) = url.strip_prefix("git@") {
        let (host, path) = rest
            .split_once(':')
            .ok_or_else(|| invalid(remote_url))?;
        return split_owner_repo(host, path).ok_or_else(|| invalid(remote_url));
    }

    for scheme in ["https://", "http://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            let (host, path) = rest
                .split_once('/')
                .ok_or_else(|| invalid(remote_url))?;
            return split_owner_repo(host, path).ok_or_else(|| invalid(remote_url));
        }
    }

    Err(invalid(remote_url))
}

fn invalid(url: &str) -> MetadataError {
    MetadataError::InvalidRemoteUrl(url.to_string())
}

fn split_owner_repo(host: &str, path: &str) -> Option<RemoteRepo> {
    if host.is_empty() {
        return None;
    }
    let mut parts = path.trim_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some(RemoteRepo {
        host: host.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Builds the one permalink shape the engine emits:
/// `https://<host>/<owner>/<repo>/blob/<commit>/<path>`.
/// The file path is normalized and stripped of leading slashes.
pub fn permalink(
    host: &str,
    owner: &str,
    repo: &str,
    commit_hash: &str,
    file_path: &str,
) -> String {
    let path = normalize_file_path(file_path);
    let path = path.trim_start_matches('/');
    format!("https://{host}/{owner}/{repo}/blob/{commit_hash}/{path}")
}
