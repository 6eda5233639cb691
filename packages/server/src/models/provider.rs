use axum::http::Uri;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::entity::provider::{self, MODES};
use crate::error::AppError;

/// Request body for registering an LLM provider.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProviderRequest {
    /// Provider name, unique per owner (1-50 characters).
    #[schema(example = "deepseek")]
    pub name: String,
    /// One of `openai`, `openai-response`, `gemini`, `anthropic`, `ollama`.
    #[schema(example = "openai")]
    pub mode: String,
    /// Absolute `http` or `https` URL of the API.
    #[schema(example = "https://api.deepseek.com/v1")]
    pub base_url: String,
    #[schema(example = "sk-0123456789abcdef")]
    pub api_key: String,
}

/// Request body for updating a provider. Absent fields are left unchanged.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProviderRequest {
    pub name: Option<String>,
    pub mode: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProviderListQuery {
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page (1-100). Default: 20.
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProviderResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "deepseek")]
    pub name: String,
    #[schema(example = "openai")]
    pub mode: String,
    #[schema(example = "https://api.deepseek.com/v1")]
    pub base_url: String,
    /// The key with all but its last four characters masked.
    #[schema(example = "****cdef")]
    pub api_key_hint: String,
    #[schema(example = 42)]
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<provider::Model> for ProviderResponse {
    fn from(m: provider::Model) -> Self {
        Self {
            id: m.id,
            api_key_hint: mask_api_key(&m.api_key),
            name: m.name,
            mode: m.mode,
            base_url: m.base_url,
            owner_id: m.owner_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProviderListResponse {
    pub data: Vec<ProviderResponse>,
    pub pagination: Pagination,
}

/// Short keys are masked entirely.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 50 {
        return Err(AppError::Validation(
            "Provider name must be 1-50 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_mode(mode: &str) -> Result<(), AppError> {
    if !MODES.contains(&mode) {
        return Err(AppError::Validation(format!(
            "mode must be one of: {}",
            MODES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_base_url(base_url: &str) -> Result<(), AppError> {
    let invalid = || AppError::Validation("base_url must be an absolute http(s) URL".into());
    let uri: Uri = base_url.trim().parse().map_err(|_| invalid())?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(host)) if !host.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn validate_api_key(api_key: &str) -> Result<(), AppError> {
    if api_key.trim().is_empty() || api_key.len() > 512 {
        return Err(AppError::Validation(
            "api_key must be 1-512 bytes".into(),
        ));
    }
    Ok(())
}

pub fn validate_create(payload: &CreateProviderRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_mode(&payload.mode)?;
    validate_base_url(&payload.base_url)?;
    validate_api_key(&payload.api_key)
}

pub fn validate_update(payload: &UpdateProviderRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(mode) = &payload.mode {
        validate_mode(mode)?;
    }
    if let Some(base_url) = &payload.base_url {
        validate_base_url(base_url)?;
    }
    if let Some(api_key) = &payload.api_key {
        validate_api_key(api_key)?;
    }
    Ok(())
}
