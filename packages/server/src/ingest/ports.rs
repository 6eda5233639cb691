use async_trait::async_trait;
use common::FileUploadedEvent;
use mq::MqError;

use super::error::RepositoryError;
use crate::entity::{dataset, file};

/// Fields for a new file row. Timestamps and id are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub object_key: String,
    pub size: i64,
    pub content_type: String,
    pub owner_id: i32,
    pub dataset_id: i32,
}

/// One page of a listing plus the total across all pages.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Relational storage for file records.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert a row. A clash on `object_key` is `RepositoryError::UniqueViolation`.
    async fn insert(&self, new_file: NewFile) -> Result<file::Model, RepositoryError>;

    /// Look up a file only if it belongs to `owner_id`.
    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<file::Model>, RepositoryError>;

    /// Remove a row. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;

    /// Set a new content type on an owned file.
    async fn update_content_type(
        &self,
        id: i32,
        owner_id: i32,
        content_type: &str,
    ) -> Result<Option<file::Model>, RepositoryError>;

    /// Newest first.
    async fn list(
        &self,
        owner_id: i32,
        dataset_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Page<file::Model>, RepositoryError>;

    async fn list_all_in_dataset(
        &self,
        owner_id: i32,
        dataset_id: i32,
    ) -> Result<Vec<file::Model>, RepositoryError>;
}

/// Ownership-checked dataset lookup.
#[async_trait]
pub trait DatasetDirectory: Send + Sync {
    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<dataset::Model>, RepositoryError>;
}

/// Durable work queue for upload events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, queue: &str, event: &FileUploadedEvent) -> Result<(), MqError>;
}
