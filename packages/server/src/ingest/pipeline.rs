use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::storage::{ObjectStore, StorageError, derive_object_key};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use super::aggregate::{BatchOutcome, FileOutcome};
use super::error::{IngestError, UploadFailure};
use super::notifier::EventNotifier;
use super::ports::{DatasetDirectory, FileRepository};
use super::worker::{FilePayload, UploadContext, UploadWorker};
use crate::utils::filename::validate_flat_filename;

/// Concurrent multi-file ingestion.
///
/// Every accepted file runs on its own task inside a per-call `JoinSet`. The
/// set is owned by the `upload_batch` future, so dropping that future (client
/// disconnect) aborts every worker still running.
#[derive(Clone)]
pub struct UploadPipeline {
    worker: UploadWorker,
    datasets: Arc<dyn DatasetDirectory>,
    max_files: usize,
    max_file_size: u64,
}

impl UploadPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        files: Arc<dyn FileRepository>,
        datasets: Arc<dyn DatasetDirectory>,
        notifier: EventNotifier,
        max_files: usize,
        max_file_size: u64,
    ) -> Self {
        Self {
            worker: UploadWorker::new(store, files, notifier),
            datasets,
            max_files,
            max_file_size,
        }
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Ingest a batch of files into one of the caller's datasets.
    ///
    /// Request-level checks (count, dataset ownership) run before any file is
    /// touched. After that each file succeeds or fails on its own, and the call
    /// only fails when nothing succeeded.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_batch(
        &self,
        owner_id: i32,
        dataset_id: i32,
        files: Vec<FilePayload>,
    ) -> Result<BatchOutcome, IngestError> {
        if files.is_empty() {
            return Err(IngestError::NoFiles);
        }
        if files.len() > self.max_files {
            return Err(IngestError::TooManyFiles {
                max: self.max_files,
                actual: files.len(),
            });
        }

        if self
            .datasets
            .find_owned(dataset_id, owner_id)
            .await?
            .is_none()
        {
            return Err(IngestError::DatasetNotFound(dataset_id));
        }

        let ctx = UploadContext {
            owner_id,
            dataset_id,
        };
        let (accepted, mut outcomes) = screen(owner_id, self.max_file_size, files);

        let mut set = JoinSet::new();
        let mut names = HashMap::with_capacity(accepted.len());
        for payload in accepted {
            let name = payload.name.clone();
            let worker = self.worker.clone();
            let handle = set.spawn(async move { worker.run(ctx, payload).await });
            names.insert(handle.id(), name);
        }
        debug!(workers = names.len(), "Upload workers spawned");

        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_, outcome)) => outcomes.push(outcome),
                Err(e) => {
                    let name = names.remove(&e.id()).unwrap_or_default();
                    error!(file = %name, error = %e, "Upload worker did not complete");
                    outcomes.push(FileOutcome::failed(
                        name,
                        UploadFailure::Aborted(e.to_string()),
                    ));
                }
            }
        }

        let batch = BatchOutcome::aggregate(outcomes).into_result()?;
        info!(
            uploaded = batch.uploaded.len(),
            failed = batch.failed.len(),
            "Batch ingested"
        );
        Ok(batch)
    }
}

/// Split a batch into files worth spawning and files already known to fail.
///
/// A name that fails validation, a declared size over the limit, or a name
/// repeating an earlier one in the same batch never reaches either backend. Two same-keyed writers in one batch would
/// race on the object key before the unique index could pick a winner.
fn screen(
    owner_id: i32,
    max_file_size: u64,
    files: Vec<FilePayload>,
) -> (Vec<FilePayload>, Vec<FileOutcome>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for mut payload in files {
        let name = match validate_flat_filename(&payload.name) {
            Ok(name) => name.to_string(),
            Err(e) => {
                rejected.push(FileOutcome::failed(
                    payload.name,
                    UploadFailure::InvalidName(e.message().to_string()),
                ));
                continue;
            }
        };

        if payload.size > max_file_size {
            rejected.push(FileOutcome::failed(
                name,
                UploadFailure::ObjectStore(StorageError::SizeLimitExceeded {
                    actual: payload.size,
                    limit: max_file_size,
                }),
            ));
            continue;
        }

        if !seen.insert(name.clone()) {
            let key = derive_object_key(owner_id, &name);
            rejected.push(FileOutcome::failed(name, UploadFailure::DuplicateKey { key }));
            continue;
        }

        payload.name = name;
        accepted.push(payload);
    }

    (accepted, rejected)
}
