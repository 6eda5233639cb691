use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::entity::dataset;
use crate::error::AppError;

/// Request body for creating a dataset.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDatasetRequest {
    /// Dataset name, unique per owner (1-100 characters).
    #[schema(example = "Quarterly reports")]
    pub name: String,
    /// A single emoji.
    #[schema(example = "📊")]
    pub icon: String,
    /// Optional description (at most 500 characters).
    #[serde(default)]
    #[schema(example = "Finance PDFs for 2024")]
    pub description: String,
}

/// Request body for updating a dataset. Absent fields are left unchanged.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateDatasetRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DatasetListQuery {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page (1-100). Default: 20.
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DatasetResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Quarterly reports")]
    pub name: String,
    #[schema(example = "📊")]
    pub icon: String,
    pub description: String,
    #[schema(example = 42)]
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<dataset::Model> for DatasetResponse {
    fn from(m: dataset::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            icon: m.icon,
            description: m.description,
            owner_id: m.owner_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DatasetListResponse {
    pub data: Vec<DatasetResponse>,
    pub pagination: Pagination,
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::Validation(
            "Dataset name must be 1-100 characters".into(),
        ));
    }
    Ok(())
}

/// An emoji is one or a few non-ASCII code points (ZWJ sequences, skin tones).
pub fn validate_icon(icon: &str) -> Result<(), AppError> {
    let icon = icon.trim();
    let count = icon.chars().count();
    if count == 0 || count > 8 || icon.chars().any(|c| c.is_ascii()) {
        return Err(AppError::Validation("Icon must be a single emoji".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > 500 {
        return Err(AppError::Validation(
            "Description must be at most 500 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create(payload: &CreateDatasetRequest) -> Result<(), AppError> {
    validate_name(&payload.name)?;
    validate_icon(&payload.icon)?;
    validate_description(&payload.description)
}

pub fn validate_update(payload: &UpdateDatasetRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(icon) = &payload.icon {
        validate_icon(icon)?;
    }
    if let Some(description) = &payload.description {
        validate_description(description)?;
    }
    Ok(())
}
