use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::provider;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::provider::*;
use crate::models::shared::{Pagination, page_bounds};
use crate::state::AppState;

fn name_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A provider with this name already exists".into())
        }
        _ => AppError::from(e),
    }
}

async fn find_owned_provider<C: ConnectionTrait>(
    db: &C,
    id: i32,
    owner_id: i32,
) -> Result<provider::Model, AppError> {
    provider::Entity::find_by_id(id)
        .filter(provider::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Provider not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Providers",
    operation_id = "createProvider",
    summary = "Register an LLM provider",
    request_body = CreateProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ProviderResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Name already used by this owner (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_provider(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProviderRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create(&payload)?;

    let now = Utc::now();
    let model = provider::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        mode: Set(payload.mode),
        base_url: Set(payload.base_url.trim().to_string()),
        api_key: Set(payload.api_key),
        owner_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(name_conflict)?;

    info!(provider_id = model.id, mode = %model.mode, "Provider created");
    Ok((StatusCode::CREATED, Json(ProviderResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Providers",
    operation_id = "listProviders",
    summary = "List the caller's providers",
    description = "Ordered by name.",
    params(ProviderListQuery),
    responses(
        (status = 200, description = "Providers", body = ProviderListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_providers(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProviderListQuery>,
) -> Result<Json<ProviderListResponse>, AppError> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let select =
        provider::Entity::find().filter(provider::Column::OwnerId.eq(auth_user.user_id));
    let total = select.clone().count(&state.db).await?;

    let data = select
        .order_by_asc(provider::Column::Name)
        .offset(page.saturating_sub(1).saturating_mul(per_page))
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ProviderListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Providers",
    operation_id = "getProvider",
    summary = "Get a provider",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider", body = ProviderResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_provider(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProviderResponse>, AppError> {
    let model = find_owned_provider(&state.db, id, auth_user.user_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Providers",
    operation_id = "updateProvider",
    summary = "Update a provider",
    params(("id" = i32, Path, description = "Provider ID")),
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ProviderResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name already used by this owner (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_provider(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProviderRequest>,
) -> Result<Json<ProviderResponse>, AppError> {
    validate_update(&payload)?;

    let existing = find_owned_provider(&state.db, id, auth_user.user_id).await?;
    let mut active: provider::ActiveModel = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(mode) = payload.mode {
        active.mode = Set(mode);
    }
    if let Some(base_url) = payload.base_url {
        active.base_url = Set(base_url.trim().to_string());
    }
    if let Some(api_key) = payload.api_key {
        active.api_key = Set(api_key);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&state.db).await.map_err(name_conflict)?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Providers",
    operation_id = "deleteProvider",
    summary = "Delete a provider",
    params(("id" = i32, Path, description = "Provider ID")),
    responses(
        (status = 204, description = "Provider deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_provider(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = provider::Entity::delete_many()
        .filter(provider::Column::Id.eq(id))
        .filter(provider::Column::OwnerId.eq(auth_user.user_id))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Provider not found".into()));
    }

    info!(provider_id = id, "Provider deleted");
    Ok(StatusCode::NO_CONTENT)
}
