use std::path::PathBuf;

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::ingest::{FilePayload, IngestError};
use crate::models::file::*;
use crate::models::shared::{Pagination, page_bounds};
use crate::state::AppState;
use crate::utils::content_type;

/// Room for a full batch at the per-file limit plus multipart framing.
pub fn upload_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let per_file = usize::try_from(config.storage.max_file_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(
        per_file
            .saturating_mul(config.upload.max_files)
            .saturating_add(1024 * 1024),
    )
}

/// One multipart file part, parked on local disk until the batch is ready.
///
/// The temp file is removed when this is dropped, whatever happened to the
/// upload.
struct SpooledFile {
    path: PathBuf,
    name: String,
    content_type: String,
    size: u64,
}

impl SpooledFile {
    async fn payload(&self) -> Result<FilePayload, AppError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        Ok(FilePayload {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            size: self.size,
            reader: Box::new(file),
        })
    }
}

impl Drop for SpooledFile {
    fn drop(&mut self) {
        // Best effort.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Park one file part on disk.
///
/// A part larger than `max_size` is drained without being written; its full
/// size is still reported so the pipeline fails that file on its own.
async fn spool_field(mut field: Field<'_>, max_size: u64) -> Result<SpooledFile, AppError> {
    let name = field.file_name().unwrap_or_default().to_string();
    let declared = field.content_type().map(str::to_string);

    let mut spooled = SpooledFile {
        path: std::env::temp_dir().join(format!("ingest-upload-{}", Uuid::new_v4())),
        content_type: content_type::resolve(declared.as_deref(), &name),
        name,
        size: 0,
    };

    let mut temp_file = tokio::fs::File::create(&spooled.path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        spooled.size += chunk.len() as u64;
        if spooled.size > max_size {
            continue;
        }
        temp_file
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    temp_file
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

    if spooled.size > max_size {
        debug!(file = %spooled.name, size = spooled.size, "Oversized part drained");
    }
    Ok(spooled)
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    operation_id = "uploadFiles",
    summary = "Upload files into a dataset",
    description = "Multipart body with a `dataset_id` text field and 1-5 `files` parts. \
        Files are stored concurrently and independently: the call succeeds if at least one \
        file was stored, and `failed` lists the ones that were not. A file over the size \
        limit fails on its own. A file whose name already exists for the caller fails \
        as a duplicate; nothing is overwritten.",
    request_body(content_type = "multipart/form-data", description = "dataset_id plus repeated files"),
    responses(
        (status = 200, description = "At least one file stored", body = UploadResponse),
        (status = 400, description = "No files, too many files, bad field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Dataset not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Every file already exists (CONFLICT)", body = ErrorBody),
        (status = 422, description = "Every file failed (UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let max_files = state.pipeline.max_files();
    let max_size = state.config.storage.max_file_size;

    let mut dataset_id: Option<i32> = None;
    let mut spooled: Vec<SpooledFile> = Vec::new();
    let mut file_parts = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("files") | Some("file") => {
                file_parts += 1;
                // Over the cap: keep counting, skip the bytes.
                if file_parts <= max_files {
                    spooled.push(spool_field(field, max_size).await?);
                }
            }
            Some("dataset_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read dataset_id: {e}")))?;
                dataset_id = Some(text.trim().parse().map_err(|_| {
                    AppError::Validation("dataset_id must be an integer".into())
                })?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let dataset_id =
        dataset_id.ok_or_else(|| AppError::Validation("Missing 'dataset_id' field".into()))?;

    if file_parts > max_files {
        return Err(IngestError::TooManyFiles {
            max: max_files,
            actual: file_parts,
        }
        .into());
    }

    debug!(dataset_id, files = spooled.len(), "Multipart body spooled");

    let mut payloads = Vec::with_capacity(spooled.len());
    for file in &spooled {
        payloads.push(file.payload().await?);
    }

    let batch = state
        .pipeline
        .upload_batch(auth_user.user_id, dataset_id, payloads)
        .await?;

    Ok(Json(batch.into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Files",
    operation_id = "listFiles",
    summary = "List files in a dataset",
    description = "Newest first.",
    params(FileListQuery),
    responses(
        (status = 200, description = "Files", body = FileListResponse),
        (status = 400, description = "Bad query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Dataset not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FileListQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let listing = state
        .catalog
        .list(auth_user.user_id, query.dataset_id, page, per_page)
        .await?;

    Ok(Json(FileListResponse {
        data: listing.items.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, listing.total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Files",
    operation_id = "getFile",
    summary = "Get file metadata",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "File", body = FileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FileResponse>, AppError> {
    let record = state.catalog.get(auth_user.user_id, id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Files",
    operation_id = "updateFile",
    summary = "Update file metadata",
    description = "Only the content type is editable; the name is fixed because the storage key derives from it.",
    params(("id" = i32, Path, description = "File ID")),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "File updated", body = FileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFileRequest>,
) -> Result<Json<FileResponse>, AppError> {
    let content_type = payload.content_type.trim();
    if !content_type::is_valid(content_type) {
        return Err(AppError::Validation(
            "content_type must look like type/subtype".into(),
        ));
    }

    let record = state
        .catalog
        .update_content_type(auth_user.user_id, id, content_type)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Files",
    operation_id = "getDownloadUrl",
    summary = "Get a presigned download URL",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "Presigned URL", body = DownloadUrlResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DownloadUrlResponse>, AppError> {
    let url = state.catalog.download_url(auth_user.user_id, id).await?;
    Ok(Json(DownloadUrlResponse {
        url,
        expires_in: state.catalog.download_ttl().as_secs(),
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Removes the stored object and the metadata row together.",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "One half of the delete failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete(auth_user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
