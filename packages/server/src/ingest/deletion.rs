use std::sync::Arc;

use common::storage::ObjectStore;
use tracing::{error, info, instrument};

use super::error::IngestError;
use super::ports::FileRepository;
use crate::entity::file;

/// Removes a file's object and row together.
///
/// Both deletes run concurrently. There is no rollback: if one half fails the
/// other may already be gone, and the caller sees `DeletionFailed`.
#[derive(Clone)]
pub struct DeletionCoordinator {
    store: Arc<dyn ObjectStore>,
    files: Arc<dyn FileRepository>,
}

impl DeletionCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, files: Arc<dyn FileRepository>) -> Self {
        Self { store, files }
    }

    #[instrument(skip_all, fields(file_id = record.id, key = %record.object_key))]
    pub async fn delete_file(&self, record: &file::Model) -> Result<(), IngestError> {
        let (object, row) = tokio::join!(
            self.store.delete(&record.object_key),
            self.files.delete(record.id),
        );

        let reason = match (object, row) {
            (Ok(()), Ok(_)) => {
                info!("File deleted");
                return Ok(());
            }
            (Err(e), _) => format!("object store: {e}"),
            (Ok(()), Err(e)) => format!("database: {e}"),
        };

        error!(reason = %reason, "File deletion incomplete");
        Err(IngestError::DeletionFailed {
            id: record.id,
            reason,
        })
    }
}
