//! Umbrella crate for Git-derived file identity.
//!
//! This crate stitches together metadata normalization, identifier
//! generation, batch orchestration and change detection so callers can
//! drive the whole pipeline from a single API entry point.

pub use gitid_batch::{
    fetch_metadata, run_batch, AdapterConfig, BatchError, BatchInput, BatchItemResult,
    BatchOptions, BatchProcessor, BatchStatus, FetchError, MetadataFetcher, ProgressFn,
    DEFAULT_BRANCH,
};
pub use gitid_detect::{
    build_manifest, compare_identifier, diff, has_changed, load_manifest, save_manifest,
    ChangeReport, ItemError, Manifest, ManifestError,
};
pub use gitid_identifier::{
    canonical_json, canonical_string, encode_digest, generate, generate_many,
    generate_normalized, Algorithm, DigestEncoding, IdentifierError, IdentifierOptions,
    IdentifierResult, SHORT_LEN,
};
pub use gitid_meta::{
    is_valid_hash, normalize, normalize_file_path, normalize_timestamp, parse_remote_url,
    permalink, validate_hash, MetadataError, MetadataSource, NormalizedMetadata, RawMetadata,
    RemoteRepo, HASH_LEN,
};

pub mod config;

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use tracing::info;

/// Errors that can occur while driving the identity pipeline end-to-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Metadata(MetadataError),
    Identifier(IdentifierError),
    Fetch(FetchError),
    Batch(BatchError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Metadata(err) => write!(f, "metadata validation failed: {err}"),
            PipelineError::Identifier(err) => write!(f, "identifier generation failed: {err}"),
            PipelineError::Fetch(err) => write!(f, "metadata fetch failed: {err}"),
            PipelineError::Batch(err) => write!(f, "batch run failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Metadata(err) => Some(err),
            PipelineError::Identifier(err) => Some(err),
            PipelineError::Fetch(err) => Some(err),
            PipelineError::Batch(err) => Some(err),
        }
    }
}

impl From<MetadataError> for PipelineError {
    fn from(value: MetadataError) -> Self {
        PipelineError::Metadata(value)
    }
}

impl From<IdentifierError> for PipelineError {
    fn from(value: IdentifierError) -> Self {
        PipelineError::Identifier(value)
    }
}

impl From<FetchError> for PipelineError {
    fn from(value: FetchError) -> Self {
        PipelineError::Fetch(value)
    }
}

impl From<BatchError> for PipelineError {
    fn from(value: BatchError) -> Self {
        PipelineError::Batch(value)
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_generate(&self, latency: Duration, result: Result<(), IdentifierError>);
    fn record_fetch(&self, latency: Duration, result: Result<(), FetchError>);
    fn record_batch(&self, latency: Duration, items: usize);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_generate(self, result: Result<(), IdentifierError>) {
        self.recorder.record_generate(self.start.elapsed(), result);
    }

    fn record_fetch(self, result: Result<(), FetchError>) {
        self.recorder.record_fetch(self.start.elapsed(), result);
    }

    fn record_batch(self, items: usize) {
        self.recorder.record_batch(self.start.elapsed(), items);
    }
}

/// Normalize + generate for one record. Errors are synchronous and typed;
/// callers must handle them before proceeding.
pub fn identify_metadata(
    raw: &RawMetadata,
    options: &IdentifierOptions,
) -> Result<IdentifierResult, PipelineError> {
    let span = MetricsSpan::start();
    match generate(raw, options) {
        Ok(result) => {
            if let Some(span) = span {
                span.record_generate(Ok(()));
            }
            Ok(result)
        }
        Err(err) => {
            if let Some(span) = span {
                span.record_generate(Err(err.clone()));
            }
            Err(PipelineError::Identifier(err))
        }
    }
}

/// Fetch one input through the adapter and identify it.
///
/// Adapter errors are fatal in this single-item mode; batch mode captures
/// them per item instead.
pub async fn identify_input(
    input: &BatchInput,
    fetcher: &dyn MetadataFetcher,
    options: &IdentifierOptions,
) -> Result<IdentifierResult, PipelineError> {
    input.validate()?;

    let fetch_span = MetricsSpan::start();
    let raw = match fetch_metadata(input, fetcher).await {
        Ok(raw) => {
            if let Some(span) = fetch_span {
                span.record_fetch(Ok(()));
            }
            raw
        }
        Err(err) => {
            if let Some(span) = fetch_span {
                span.record_fetch(Err(err.clone()));
            }
            return Err(PipelineError::Fetch(err));
        }
    };

    identify_metadata(&raw, options)
}

/// Runs the batch orchestrator over `inputs` and records the run in the
/// installed metrics recorder, if any.
pub async fn snapshot(
    inputs: Vec<BatchInput>,
    fetcher: Arc<dyn MetadataFetcher>,
    options: &BatchOptions,
    progress: Option<ProgressFn>,
) -> Result<Vec<BatchItemResult>, PipelineError> {
    let span = MetricsSpan::start();
    let total = inputs.len();
    match run_batch(inputs, fetcher, options, progress).await {
        Ok(results) => {
            info!(
                total,
                failed = results.iter().filter(|r| !r.is_success()).count(),
                "batch_snapshot_complete"
            );
            if let Some(span) = span {
                span.record_batch(results.len());
            }
            Ok(results)
        }
        Err(err) => Err(PipelineError::Batch(err)),
    }
}

/// Batch + diff in one call: identify every input and classify the outcome
/// against the previous manifest.
pub async fn detect_changes(
    inputs: Vec<BatchInput>,
    fetcher: Arc<dyn MetadataFetcher>,
    options: &BatchOptions,
    previous: &Manifest,
) -> Result<ChangeReport, PipelineError> {
    let results = snapshot(inputs, fetcher, options, None).await?;
    Ok(diff(&results, previous))
}

/// Canned metadata record used by the demo binary and smoke tests.
pub fn sample_metadata() -> RawMetadata {
    RawMetadata {
        source: Some(MetadataSource::GithubApi),
        owner: Some("octocat".into()),
        repo: Some("hello-world".into()),
        branch: Some("main".into()),
        commit_hash: Some("7fd1a60b01f91b314f59955a4e4d4e80d8edf11d".into()),
        file_path: Some("README.md".into()),
        file_hash: Some("980a0d5f19a64b4b30a87d4206aade58726b60e3".into()),
        last_modified: Some("2024-01-01T12:00:00Z".into()),
        html_url: None,
        repo_path: None,
    }
}
