use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::entity::file;
use crate::ingest::{BatchOutcome, FailedUpload, UploadedFile};

/// A stored file.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    #[schema(example = 99)]
    pub id: i32,
    #[schema(example = "a.pdf")]
    pub name: String,
    #[schema(example = 48213)]
    pub size: i64,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    #[schema(example = 42)]
    pub owner_id: i32,
    #[schema(example = 7)]
    pub dataset_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<file::Model> for FileResponse {
    fn from(m: file::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            size: m.size,
            content_type: m.content_type,
            owner_id: m.owner_id,
            dataset_id: m.dataset_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A file accepted in an upload batch.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadedFileResponse {
    #[schema(example = 99)]
    pub id: i32,
    #[schema(example = "a.pdf")]
    pub name: String,
    #[schema(example = 48213)]
    pub size: i64,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    #[schema(example = 42)]
    pub owner_id: i32,
    #[schema(example = 7)]
    pub dataset_id: i32,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(f: UploadedFile) -> Self {
        Self {
            id: f.id,
            name: f.name,
            size: f.size,
            content_type: f.content_type,
            owner_id: f.owner_id,
            dataset_id: f.dataset_id,
        }
    }
}

/// A file rejected in an upload batch.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FailedFileResponse {
    #[schema(example = "a.pdf")]
    pub name: String,
    #[schema(example = "a file already exists at 42/a.pdf")]
    pub reason: String,
}

impl From<FailedUpload> for FailedFileResponse {
    fn from(f: FailedUpload) -> Self {
        Self {
            name: f.name,
            reason: f.cause.to_string(),
        }
    }
}

/// Result of a batch upload. `failed` is empty unless some files were rejected
/// while others went through.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub files: Vec<UploadedFileResponse>,
    pub failed: Vec<FailedFileResponse>,
}

impl From<BatchOutcome> for UploadResponse {
    fn from(batch: BatchOutcome) -> Self {
        Self {
            files: batch.uploaded.into_iter().map(Into::into).collect(),
            failed: batch.failed.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileListQuery {
    /// Dataset to list.
    pub dataset_id: i32,
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page (1-100). Default: 20.
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FileListResponse {
    pub data: Vec<FileResponse>,
    pub pagination: Pagination,
}

/// Request body for updating file metadata.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateFileRequest {
    /// New MIME type.
    #[schema(example = "text/markdown")]
    pub content_type: String,
}

/// Time-limited download link.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DownloadUrlResponse {
    pub url: String,
    /// Seconds until `url` stops working.
    #[schema(example = 3600)]
    pub expires_in: u64,
}
