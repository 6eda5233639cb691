use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named collection of files owned by one user.
///
/// `(owner_id, name)` is unique; the index is created in `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dataset")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// A single emoji.
    pub icon: String,
    pub description: String,

    pub owner_id: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
