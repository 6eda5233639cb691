use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for one uploaded file. The bytes live in the object store.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename.
    pub name: String,

    /// `{owner_id}/{name}`. The unique constraint here is the only arbiter
    /// between concurrent uploads of the same name.
    #[sea_orm(unique)]
    pub object_key: String,

    pub size: i64,

    /// MIME content type.
    pub content_type: String,

    pub owner_id: i32,
    pub dataset_id: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
