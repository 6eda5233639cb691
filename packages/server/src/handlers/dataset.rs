use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::dataset;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::dataset::*;
use crate::models::shared::{Pagination, escape_like, page_bounds};
use crate::state::AppState;

fn name_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A dataset with this name already exists".into())
        }
        _ => AppError::from(e),
    }
}

async fn find_owned_dataset<C: ConnectionTrait>(
    db: &C,
    id: i32,
    owner_id: i32,
) -> Result<dataset::Model, AppError> {
    dataset::Entity::find_by_id(id)
        .filter(dataset::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dataset not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Datasets",
    operation_id = "createDataset",
    summary = "Create a dataset",
    request_body = CreateDatasetRequest,
    responses(
        (status = 201, description = "Dataset created", body = DatasetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Name already used by this owner (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_dataset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDatasetRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create(&payload)?;

    let now = Utc::now();
    let model = dataset::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        icon: Set(payload.icon.trim().to_string()),
        description: Set(payload.description),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(name_conflict)?;

    info!(dataset_id = model.id, "Dataset created");
    Ok((StatusCode::CREATED, Json(DatasetResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Datasets",
    operation_id = "listDatasets",
    summary = "List the caller's datasets",
    description = "Newest first. `name` filters by case-insensitive substring.",
    params(DatasetListQuery),
    responses(
        (status = 200, description = "Datasets", body = DatasetListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_datasets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DatasetListQuery>,
) -> Result<Json<DatasetListResponse>, AppError> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let mut select = dataset::Entity::find().filter(dataset::Column::OwnerId.eq(auth_user.user_id));

    if let Some(ref name) = query.name {
        let term = escape_like(name.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(dataset::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select.clone().count(&state.db).await?;

    let data = select
        .order_by_desc(dataset::Column::CreatedAt)
        .order_by_desc(dataset::Column::Id)
        .offset(page.saturating_sub(1).saturating_mul(per_page))
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(DatasetListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Datasets",
    operation_id = "getDataset",
    summary = "Get a dataset",
    params(("id" = i32, Path, description = "Dataset ID")),
    responses(
        (status = 200, description = "Dataset", body = DatasetResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_dataset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DatasetResponse>, AppError> {
    let model = find_owned_dataset(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Datasets",
    operation_id = "updateDataset",
    summary = "Update a dataset",
    params(("id" = i32, Path, description = "Dataset ID")),
    request_body = UpdateDatasetRequest,
    responses(
        (status = 200, description = "Dataset updated", body = DatasetResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used by this owner (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_dataset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateDatasetRequest>,
) -> Result<Json<DatasetResponse>, AppError> {
    validate_update(&payload)?;

    let existing = find_owned_dataset(&state.db, id, auth_user.user_id).await?;
    let mut active: dataset::ActiveModel = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(icon) = payload.icon {
        active.icon = Set(icon.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&state.db).await.map_err(name_conflict)?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Datasets",
    operation_id = "deleteDataset",
    summary = "Delete a dataset and its files",
    description = "Deletes every file in the dataset (object and row), then the dataset itself. \
        If a file cannot be deleted the dataset is kept so the call can be retried.",
    params(("id" = i32, Path, description = "Dataset ID")),
    responses(
        (status = 204, description = "Dataset deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_dataset(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = state.catalog.purge_dataset(auth_user.user_id, id).await?;

    dataset::Entity::delete_many()
        .filter(dataset::Column::Id.eq(id))
        .filter(dataset::Column::OwnerId.eq(auth_user.user_id))
        .exec(&state.db)
        .await?;

    info!(dataset_id = id, files_removed = removed, "Dataset deleted");
    Ok(StatusCode::NO_CONTENT)
}
