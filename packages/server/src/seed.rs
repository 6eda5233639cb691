use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{dataset, file, provider};

fn dataset_name_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .unique()
        .name("idx_dataset_owner_name")
        .table(dataset::Entity)
        .col(dataset::Column::OwnerId)
        .col(dataset::Column::Name)
        .to_owned()
}

fn provider_name_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .unique()
        .name("idx_provider_owner_name")
        .table(provider::Entity)
        .col(provider::Column::OwnerId)
        .col(provider::Column::Name)
        .to_owned()
}

fn file_listing_index() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name("idx_file_owner_dataset_created")
        .table(file::Entity)
        .col(file::Column::OwnerId)
        .col(file::Column::DatasetId)
        .col(file::Column::CreatedAt)
        .to_owned()
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't create composite indexes, so they are created
/// here on startup. The dataset and provider name indexes back uniqueness
/// rules and must exist; the listing index only speeds up queries.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(&dataset_name_index().to_string(PostgresQueryBuilder))
        .await?;
    info!("Ensured index idx_dataset_owner_name exists");

    db.execute_unprepared(&provider_name_index().to_string(PostgresQueryBuilder))
        .await?;
    info!("Ensured index idx_provider_owner_name exists");

    // SELECT ... FROM file WHERE owner_id = ? AND dataset_id = ? ORDER BY created_at DESC
    match db
        .execute_unprepared(&file_listing_index().to_string(PostgresQueryBuilder))
        .await
    {
        Ok(_) => info!("Ensured index idx_file_owner_dataset_created exists"),
        Err(e) => warn!(
            "Failed to create index idx_file_owner_dataset_created: {}",
            e
        ),
    }

    Ok(())
}
