use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Connection settings for an LLM backend, owned by one user.
///
/// `(owner_id, name)` is unique; the index is created in `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Wire protocol, one of [`MODES`].
    pub mode: String,
    pub base_url: String,
    /// Never serialized into API responses.
    pub api_key: String,

    pub owner_id: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

pub const MODES: &[&str] = &["openai", "openai-response", "gemini", "anthropic", "ollama"];

impl ActiveModelBehavior for ActiveModel {}
