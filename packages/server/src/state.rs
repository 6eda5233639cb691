use std::sync::Arc;
use std::time::Duration;

use common::storage::ObjectStore;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::S3ObjectStore;
use common::{StorageBackend, StorageConfig};
use mq::Mq;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::ingest::{
    EventNotifier, FileCatalog, MqEventPublisher, SeaOrmDatasetDirectory, SeaOrmFileRepository,
    UploadPipeline,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub pipeline: UploadPipeline,
    pub catalog: FileCatalog,
}

impl AppState {
    /// Wire the ingestion services over shared handles.
    ///
    /// Without `mq` upload events are dropped.
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        store: Arc<dyn ObjectStore>,
        mq: Option<Arc<Mq>>,
    ) -> Self {
        let files = Arc::new(SeaOrmFileRepository::new(db.clone()));
        let datasets = Arc::new(SeaOrmDatasetDirectory::new(db.clone()));

        let notifier = match mq {
            Some(mq) => EventNotifier::new(
                Arc::new(MqEventPublisher::new(mq)),
                config.mq.upload_event_queue.clone(),
            ),
            None => EventNotifier::disabled(),
        };

        let pipeline = UploadPipeline::new(
            store.clone(),
            files.clone(),
            datasets.clone(),
            notifier,
            config.upload.max_files,
            config.storage.max_file_size,
        );
        let catalog = FileCatalog::new(
            store,
            files,
            datasets,
            Duration::from_secs(config.upload.download_url_ttl_secs),
        );

        Self {
            config: Arc::new(config),
            db,
            pipeline,
            catalog,
        }
    }
}

/// Build the configured object store backend.
pub async fn init_object_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::S3 => Arc::new(S3ObjectStore::from_config(config)?),
        StorageBackend::Filesystem => Arc::new(
            FilesystemObjectStore::new(
                config.data_dir.clone(),
                config.public_base_url.clone(),
                config.max_file_size,
            )
            .await?,
        ),
    };
    Ok(store)
}
