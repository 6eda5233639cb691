use common::storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

use super::aggregate::FailedUpload;

/// Errors surfaced by the repository ports.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Why a single file in a batch did not make it.
///
/// These never fail the batch on their own; they become `Failed` outcomes.
#[derive(Debug, Error)]
pub enum UploadFailure {
    #[error("object store write failed: {0}")]
    ObjectStore(#[from] StorageError),

    #[error("a file already exists at {key}")]
    DuplicateKey { key: String },

    #[error("database write failed: {0}")]
    Database(String),

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("upload task aborted: {0}")]
    Aborted(String),
}

impl UploadFailure {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    pub(crate) fn from_metadata(err: RepositoryError, key: &str) -> Self {
        match err {
            RepositoryError::UniqueViolation(_) => Self::DuplicateKey {
                key: key.to_string(),
            },
            RepositoryError::Db(e) => Self::Database(e.to_string()),
        }
    }
}

/// Request-level errors from the ingestion pipeline and file catalog.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no files were provided")]
    NoFiles,

    #[error("too many files: {actual} provided, at most {max} allowed")]
    TooManyFiles { max: usize, actual: usize },

    #[error("dataset {0} not found")]
    DatasetNotFound(i32),

    #[error("file {0} not found")]
    FileNotFound(i32),

    #[error("all {} uploads failed", .0.len())]
    AllUploadsFailed(Vec<FailedUpload>),

    #[error("failed to delete file {id}: {reason}")]
    DeletionFailed { id: i32, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
