use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use super::error::RepositoryError;
use super::ports::{DatasetDirectory, FileRepository, NewFile, Page};
use crate::entity::{dataset, file};

fn classify(e: DbErr) -> RepositoryError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::UniqueViolation(detail),
        _ => RepositoryError::Db(e),
    }
}

/// File rows in Postgres.
#[derive(Clone)]
pub struct SeaOrmFileRepository {
    db: DatabaseConnection,
}

impl SeaOrmFileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn owned(id: i32, owner_id: i32) -> sea_orm::Select<file::Entity> {
        file::Entity::find_by_id(id).filter(file::Column::OwnerId.eq(owner_id))
    }

    fn in_dataset(owner_id: i32, dataset_id: i32) -> sea_orm::Select<file::Entity> {
        file::Entity::find()
            .filter(file::Column::OwnerId.eq(owner_id))
            .filter(file::Column::DatasetId.eq(dataset_id))
    }
}

#[async_trait]
impl FileRepository for SeaOrmFileRepository {
    async fn insert(&self, new_file: NewFile) -> Result<file::Model, RepositoryError> {
        let now = Utc::now();
        let model = file::ActiveModel {
            name: Set(new_file.name),
            object_key: Set(new_file.object_key),
            size: Set(new_file.size),
            content_type: Set(new_file.content_type),
            owner_id: Set(new_file.owner_id),
            dataset_id: Set(new_file.dataset_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(classify)
    }

    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<file::Model>, RepositoryError> {
        Ok(Self::owned(id, owner_id).one(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = file::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn update_content_type(
        &self,
        id: i32,
        owner_id: i32,
        content_type: &str,
    ) -> Result<Option<file::Model>, RepositoryError> {
        let Some(existing) = Self::owned(id, owner_id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: file::ActiveModel = existing.into();
        active.content_type = Set(content_type.to_string());
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }

    async fn list(
        &self,
        owner_id: i32,
        dataset_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<Page<file::Model>, RepositoryError> {
        let query = Self::in_dataset(owner_id, dataset_id);
        let total = query.clone().count(&self.db).await?;

        let items = query
            .order_by_desc(file::Column::CreatedAt)
            .order_by_desc(file::Column::Id)
            .offset(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page)
            .all(&self.db)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all_in_dataset(
        &self,
        owner_id: i32,
        dataset_id: i32,
    ) -> Result<Vec<file::Model>, RepositoryError> {
        Ok(Self::in_dataset(owner_id, dataset_id)
            .order_by_asc(file::Column::Id)
            .all(&self.db)
            .await?)
    }
}

/// Dataset ownership lookups in Postgres.
#[derive(Clone)]
pub struct SeaOrmDatasetDirectory {
    db: DatabaseConnection,
}

impl SeaOrmDatasetDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DatasetDirectory for SeaOrmDatasetDirectory {
    async fn find_owned(
        &self,
        id: i32,
        owner_id: i32,
    ) -> Result<Option<dataset::Model>, RepositoryError> {
        Ok(dataset::Entity::find_by_id(id)
            .filter(dataset::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?)
    }
}
