//! Bounded-concurrency batch orchestration over the identity pipeline.
//!
//! [`run_batch`] fans the fetch → normalize → generate pipeline out over
//! many inputs with a concurrency cap and partial-failure resilience: one
//! item's error never cancels its siblings, and the result vector always
//! matches the input length when `continue_on_error` is set.
//!
//! The orchestrator is a worker pool over a shared index queue. Workers
//! claim indices from an atomic cursor, so at most `concurrency` items are
//! in flight and a new item is admitted as soon as any worker frees up.
//! Results land in slots keyed by original input index, which keeps the
//! output in input order even though completion order is unconstrained.

mod adapter;
mod types;

pub use adapter::{AdapterConfig, FetchError, MetadataFetcher};
pub use types::{BatchInput, BatchItemResult, BatchOptions, BatchStatus, DEFAULT_BRANCH};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use gitid_identifier::{generate, IdentifierOptions};
use gitid_meta::RawMetadata;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Callback invoked once per settled item, in completion order, with a
/// strictly increasing `done` counter up to the input length.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Errors that abort a whole batch run. Individual item failures are
/// captured in their [`BatchItemResult`] instead of surfacing here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("invalid batch input: {0}")]
    InvalidInput(String),

    /// First failure in a `continue_on_error = false` run. Items that were
    /// never admitted are dropped by design.
    #[error("batch aborted on {file_path}: {message}")]
    Aborted { file_path: String, message: String },
}

/// Dispatches one input to the adapter entry point its discriminator
/// selects.
pub async fn fetch_metadata(
    input: &BatchInput,
    fetcher: &dyn MetadataFetcher,
) -> Result<RawMetadata, FetchError> {
    match input {
        BatchInput::Local {
            repo_path,
            file_path,
        } => fetcher.local_metadata(repo_path, file_path).await,
        BatchInput::Remote {
            owner,
            repo,
            file_path,
            ..
        } => {
            fetcher
                .remote_metadata(owner, repo, file_path, input.branch())
                .await
        }
    }
}

/// Runs the identity pipeline over `inputs` with at most
/// `options.concurrency` items in flight.
///
/// Inputs are validated up front; an empty batch resolves immediately
/// without touching the adapter or the progress callback. With
/// `continue_on_error` set (the default), every input yields exactly one
/// result, in input order. Without it, the first failing item stops
/// admission of not-yet-started items (in-flight items finish on their
/// own) and the run returns [`BatchError::Aborted`].
pub async fn run_batch(
    inputs: Vec<BatchInput>,
    fetcher: Arc<dyn MetadataFetcher>,
    options: &BatchOptions,
    progress: Option<ProgressFn>,
) -> Result<Vec<BatchItemResult>, BatchError> {
    if options.concurrency == 0 {
        return Err(BatchError::InvalidConcurrency);
    }
    for input in &inputs {
        input.validate()?;
    }
    let total = inputs.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let inputs = Arc::new(inputs);
    let cursor = Arc::new(AtomicUsize::new(0));
    let abort = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<(usize, BatchItemResult)>(total);

    let mut workers = JoinSet::new();
    for _ in 0..options.concurrency.min(total) {
        let inputs = Arc::clone(&inputs);
        let cursor = Arc::clone(&cursor);
        let abort = Arc::clone(&abort);
        let fetcher = Arc::clone(&fetcher);
        let identifier_options = options.identifier.clone();
        let tx = tx.clone();

        workers.spawn(async move {
            loop {
                if abort.load(Ordering::Acquire) {
                    break;
                }
                let index = cursor.fetch_add(1, Ordering::AcqRel);
                if index >= total {
                    break;
                }
                let item =
                    process_item(&inputs[index], fetcher.as_ref(), &identifier_options).await;
                if tx.send((index, item)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    // Single collector loop: the progress counter and the abort decision
    // only change here, at settle transitions, so no locks guard them.
    let mut slots: Vec<Option<BatchItemResult>> = (0..total).map(|_| None).collect();
    let mut done = 0usize;
    let mut first_failure: Option<(String, String)> = None;

    while let Some((index, item)) = rx.recv().await {
        done += 1;
        if let Some(callback) = progress.as_ref() {
            callback(done, total);
        }
        if !item.is_success() && !options.continue_on_error && first_failure.is_none() {
            abort.store(true, Ordering::Release);
            first_failure = Some((
                item.file_path.clone(),
                item.error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        slots[index] = Some(item);
    }
    while workers.join_next().await.is_some() {}

    if let Some((file_path, message)) = first_failure {
        return Err(BatchError::Aborted { file_path, message });
    }
    Ok(slots.into_iter().flatten().collect())
}

async fn process_item(
    input: &BatchInput,
    fetcher: &dyn MetadataFetcher,
    options: &IdentifierOptions,
) -> BatchItemResult {
    let file_path = input.file_path().to_string();

    let raw = match fetch_metadata(input, fetcher).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(file_path = %file_path, error = %err, "batch_fetch_failure");
            let message = describe_fetch_error(input, &err);
            return BatchItemResult::failure(file_path, message);
        }
    };

    match generate(&raw, options) {
        Ok(result) => {
            debug!(file_path = %file_path, "batch_item_success");
            BatchItemResult::success(file_path, result)
        }
        Err(err) => {
            warn!(file_path = %file_path, error = %err, "batch_generate_failure");
            BatchItemResult::failure(file_path, err.to_string())
        }
    }
}

/// `NotFound`, `RateLimited` and `AuthFailed` surface verbatim; any other
/// adapter failure is wrapped with the failing operation and path.
fn describe_fetch_error(input: &BatchInput, err: &FetchError) -> String {
    match err {
        FetchError::Adapter(message) => {
            format!("metadata fetch failed for {}: {message}", input.file_path())
        }
        other => other.to_string(),
    }
}

/// Reusable batch driver that carries options and progress subscribers
/// across runs.
pub struct BatchProcessor {
    options: BatchOptions,
    progress: Vec<ProgressFn>,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            progress: Vec::new(),
        }
    }

    /// Registers a progress subscriber; chainable.
    pub fn on_progress(mut self, callback: ProgressFn) -> Self {
        self.progress.push(callback);
        self
    }

    pub async fn process(
        &self,
        inputs: Vec<BatchInput>,
        fetcher: Arc<dyn MetadataFetcher>,
    ) -> Result<Vec<BatchItemResult>, BatchError> {
        let progress = if self.progress.is_empty() {
            None
        } else {
            let subscribers = self.progress.clone();
            Some(Arc::new(move |done: usize, total: usize| {
                for subscriber in &subscribers {
                    subscriber(done, total);
                }
            }) as ProgressFn)
        };
        run_batch(inputs, Arc::clone(&fetcher), &self.options, progress).await
    }
}
