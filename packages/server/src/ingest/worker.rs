use std::sync::Arc;

use common::storage::{BoxReader, ObjectStore, derive_object_key, staging_key};
use tracing::{error, info, instrument, warn};

use super::aggregate::{FileOutcome, UploadedFile};
use super::error::UploadFailure;
use super::notifier::EventNotifier;
use super::ports::{FileRepository, NewFile};

/// One file of a batch, ready to stream.
pub struct FilePayload {
    pub name: String,
    pub content_type: String,
    /// Declared size in bytes.
    pub size: u64,
    pub reader: BoxReader,
}

/// Caller and target of a batch.
#[derive(Debug, Clone, Copy)]
pub struct UploadContext {
    pub owner_id: i32,
    pub dataset_id: i32,
}

/// Dual-write worker for a single file.
///
/// The object is streamed to a private staging key while the metadata row is
/// inserted; both are joined before anything is decided. Only when the row is
/// committed is the staged object renamed onto the real key, so a rejected
/// duplicate never touches the object of the existing record. Any failure
/// removes whichever half was written.
#[derive(Clone)]
pub struct UploadWorker {
    store: Arc<dyn ObjectStore>,
    files: Arc<dyn FileRepository>,
    notifier: EventNotifier,
}

impl UploadWorker {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        files: Arc<dyn FileRepository>,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            store,
            files,
            notifier,
        }
    }

    #[instrument(skip_all, fields(file = %payload.name, owner_id = ctx.owner_id, dataset_id = ctx.dataset_id))]
    pub async fn run(&self, ctx: UploadContext, payload: FilePayload) -> FileOutcome {
        let FilePayload {
            name,
            content_type,
            size,
            reader,
        } = payload;

        let key = derive_object_key(ctx.owner_id, &name);
        let staged = staging_key(&key);
        let new_file = NewFile {
            name: name.clone(),
            object_key: key.clone(),
            size: i64::try_from(size).unwrap_or(i64::MAX),
            content_type: content_type.clone(),
            owner_id: ctx.owner_id,
            dataset_id: ctx.dataset_id,
        };

        let (object, metadata) = tokio::join!(
            self.store.put_stream(&staged, reader, size, &content_type),
            self.files.insert(new_file),
        );

        match (object, metadata) {
            (Ok(_), Ok(record)) => {
                if let Err(promote_err) = self.store.rename(&staged, &key).await {
                    warn!(key = %key, error = %promote_err, "Promoting staged object failed");
                    self.discard_row(record.id, &key).await;
                    self.discard_object(&staged).await;
                    return FileOutcome::failed(name, UploadFailure::ObjectStore(promote_err));
                }
                // Detached; the outcome does not depend on it.
                let _ = self.notifier.notify_uploaded(&record);
                info!(file_id = record.id, key = %key, "File uploaded");
                FileOutcome::Uploaded(UploadedFile {
                    id: record.id,
                    owner_id: record.owner_id,
                    dataset_id: record.dataset_id,
                    name: record.name,
                    content_type: record.content_type,
                    size: record.size,
                })
            }
            (Err(object_err), Ok(record)) => {
                warn!(key = %key, error = %object_err, "Object write failed, removing metadata row");
                self.discard_row(record.id, &key).await;
                FileOutcome::failed(name, UploadFailure::ObjectStore(object_err))
            }
            (Ok(_), Err(metadata_err)) => {
                let cause = UploadFailure::from_metadata(metadata_err, &key);
                if cause.is_duplicate() {
                    warn!(key = %key, "Duplicate file name, discarding staged object");
                } else {
                    warn!(key = %key, error = %cause, "Metadata write failed, discarding staged object");
                }
                self.discard_object(&staged).await;
                FileOutcome::failed(name, cause)
            }
            (Err(object_err), Err(metadata_err)) => {
                warn!(
                    key = %key,
                    object_error = %object_err,
                    metadata_error = %metadata_err,
                    "Both writes failed"
                );
                FileOutcome::failed(name, UploadFailure::ObjectStore(object_err))
            }
        }
    }

    async fn discard_row(&self, id: i32, key: &str) {
        if let Err(e) = self.files.delete(id).await {
            error!(
                file_id = id,
                key,
                error = %e,
                "Compensating row delete failed; row has no object"
            );
        }
    }

    async fn discard_object(&self, staged: &str) {
        if let Err(e) = self.store.delete(staged).await {
            error!(
                key = staged,
                error = %e,
                "Compensating object delete failed; staged object left behind"
            );
        }
    }
}
