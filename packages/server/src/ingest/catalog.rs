use std::sync::Arc;
use std::time::Duration;

use common::storage::{ObjectStore, StorageError};
use tracing::{info, instrument, warn};

use super::deletion::DeletionCoordinator;
use super::error::IngestError;
use super::ports::{DatasetDirectory, FileRepository, Page};
use crate::entity::file;

/// Read and maintenance operations on already-ingested files.
///
/// Every lookup goes through `find_owned`, so another user's file is
/// indistinguishable from a missing one.
#[derive(Clone)]
pub struct FileCatalog {
    store: Arc<dyn ObjectStore>,
    files: Arc<dyn FileRepository>,
    datasets: Arc<dyn DatasetDirectory>,
    deletion: DeletionCoordinator,
    download_ttl: Duration,
}

impl FileCatalog {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        files: Arc<dyn FileRepository>,
        datasets: Arc<dyn DatasetDirectory>,
        download_ttl: Duration,
    ) -> Self {
        Self {
            deletion: DeletionCoordinator::new(store.clone(), files.clone()),
            store,
            files,
            datasets,
            download_ttl,
        }
    }

    pub fn download_ttl(&self) -> Duration {
        self.download_ttl
    }

    pub async fn get(&self, owner_id: i32, id: i32) -> Result<file::Model, IngestError> {
        self.files
            .find_owned(id, owner_id)
            .await?
            .ok_or(IngestError::FileNotFound(id))
    }

    /// Presigned download URL valid for `download_ttl`.
    #[instrument(skip(self))]
    pub async fn download_url(&self, owner_id: i32, id: i32) -> Result<String, IngestError> {
        let record = self.get(owner_id, id).await?;
        match self
            .store
            .presigned_download_url(&record.object_key, self.download_ttl)
            .await
        {
            Ok(url) => Ok(url),
            Err(StorageError::NotFound(key)) => {
                warn!(file_id = id, key = %key, "File row has no object");
                Err(IngestError::FileNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: i32, id: i32) -> Result<(), IngestError> {
        let record = self.get(owner_id, id).await?;
        self.deletion.delete_file(&record).await
    }

    #[instrument(skip(self))]
    pub async fn update_content_type(
        &self,
        owner_id: i32,
        id: i32,
        content_type: &str,
    ) -> Result<file::Model, IngestError> {
        self.files
            .update_content_type(id, owner_id, content_type)
            .await?
            .ok_or(IngestError::FileNotFound(id))
    }

    pub async fn list(
        &self,
        owner_id: i32,
        dataset_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Page<file::Model>, IngestError> {
        self.ensure_dataset(owner_id, dataset_id).await?;
        Ok(self.files.list(owner_id, dataset_id, page, per_page).await?)
    }

    /// Delete every file in a dataset, stopping at the first failure.
    ///
    /// Returns the number of files removed.
    #[instrument(skip(self))]
    pub async fn purge_dataset(&self, owner_id: i32, dataset_id: i32) -> Result<usize, IngestError> {
        self.ensure_dataset(owner_id, dataset_id).await?;
        let records = self.files.list_all_in_dataset(owner_id, dataset_id).await?;
        for record in &records {
            self.deletion.delete_file(record).await?;
        }
        info!(removed = records.len(), "Dataset files purged");
        Ok(records.len())
    }

    async fn ensure_dataset(&self, owner_id: i32, dataset_id: i32) -> Result<(), IngestError> {
        match self.datasets.find_owned(dataset_id, owner_id).await? {
            Some(_) => Ok(()),
            None => Err(IngestError::DatasetNotFound(dataset_id)),
        }
    }
}
