//! Change detection over identifier manifests.
//!
//! Compares metadata pairs and identifier strings, diffs a batch run
//! against a stored manifest to classify files as added, modified,
//! unchanged or removed, and round-trips the persisted manifest format.
//! No file bytes are ever read here; everything works off identifiers.

use std::collections::{BTreeMap, HashSet};

use gitid_batch::BatchItemResult;
use gitid_meta::RawMetadata;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted mapping from normalized file path to identifier string.
/// Key-sorted so serialization is stable across runs.
pub type Manifest = BTreeMap<String, String>;

/// Errors raised while encoding or decoding a manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("failed to parse manifest JSON: {0}")]
    Parse(String),
    #[error("failed to encode manifest JSON: {0}")]
    Encode(String),
}

/// A processing failure carried in a change report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub file_path: String,
    pub error: String,
}

/// Partition of current paths and manifest keys after a diff.
///
/// Every successfully processed current path lands in exactly one of
/// `added` / `modified` / `unchanged`; error items land in `errors` only;
/// manifest keys never seen in the current run land in `removed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeReport {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
    pub errors: Vec<ItemError>,
}

impl ChangeReport {
    /// True when nothing moved and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.removed.is_empty()
            && self.errors.is_empty()
    }
}

/// Compares two metadata records without reading file bytes.
///
/// File hashes are the primary signal, commit hashes the fallback. When
/// neither pair is comparable, or either record is missing entirely, the
/// answer is the conservative `true`: equality that cannot be proven is
/// treated as change.
pub fn has_changed(current: Option<&RawMetadata>, previous: Option<&RawMetadata>) -> bool {
    let (Some(a), Some(b)) = (current, previous) else {
        return true;
    };

    if let (Some(x), Some(y)) = (present(&a.file_hash), present(&b.file_hash)) {
        return x != y;
    }
    if let (Some(x), Some(y)) = (present(&a.commit_hash), present(&b.commit_hash)) {
        return x != y;
    }
    true
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Strict identifier equality. An empty value on either side can prove
/// nothing, so it never reports a match.
pub fn compare_identifier(current: &str, stored: &str) -> bool {
    !current.is_empty() && !stored.is_empty() && current == stored
}

/// Classifies a batch run against the previous manifest.
pub fn diff(current: &[BatchItemResult], previous: &Manifest) -> ChangeReport {
    let mut report = ChangeReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());

    for item in current {
        seen.insert(item.file_path.as_str());

        if !item.is_success() {
            report.errors.push(ItemError {
                file_path: item.file_path.clone(),
                error: item
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
            continue;
        }

        let identifier = item.identifier.as_deref().unwrap_or_default();
        match previous.get(&item.file_path) {
            None => report.added.push(item.file_path.clone()),
            Some(stored) if compare_identifier(identifier, stored) => {
                report.unchanged.push(item.file_path.clone());
            }
            Some(_) => report.modified.push(item.file_path.clone()),
        }
    }

    for path in previous.keys() {
        if !seen.contains(path.as_str()) {
            report.removed.push(path.clone());
        }
    }

    report
}

/// Projects successful items into a fresh manifest.
///
/// Error items are omitted, so a previously known, now-erroring path is
/// neither updated nor deleted here; callers that want erroring files to
/// retain their last-known identifier must merge with the prior manifest
/// themselves.
pub fn build_manifest(results: &[BatchItemResult]) -> Manifest {
    let mut manifest = Manifest::new();
    for item in results {
        if item.is_success() {
            if let Some(identifier) = &item.identifier {
                manifest.insert(item.file_path.clone(), identifier.clone());
            }
        }
    }
    manifest
}

/// Serializes a manifest as a flat JSON object, pretty-printed with
/// two-space indentation when requested. Formatting never affects
/// round-trip equality of the parsed structure.
pub fn save_manifest(manifest: &Manifest, pretty: bool) -> Result<String, ManifestError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(manifest)
    } else {
        serde_json::to_string(manifest)
    };
    encoded.map_err(|err| ManifestError::Encode(err.to_string()))
}

/// Parses a manifest previously produced by [`save_manifest`].
pub fn load_manifest(json: &str) -> Result<Manifest, ManifestError> {
    serde_json::from_str(json).map_err(|err| ManifestError::Parse(err.to_string()))
}
