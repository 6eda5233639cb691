//! Concurrent multi-file ingestion into the object store and the file table.

pub mod aggregate;
pub mod catalog;
pub mod deletion;
pub mod error;
pub mod notifier;
pub mod pipeline;
pub mod ports;
pub mod store;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{BatchOutcome, FailedUpload, FileOutcome, UploadedFile};
pub use catalog::FileCatalog;
pub use deletion::DeletionCoordinator;
pub use error::{IngestError, RepositoryError, UploadFailure};
pub use notifier::{EventNotifier, MqEventPublisher};
pub use pipeline::UploadPipeline;
pub use ports::{DatasetDirectory, EventPublisher, FileRepository, NewFile, Page};
pub use store::{SeaOrmDatasetDirectory, SeaOrmFileRepository};
pub use worker::{FilePayload, UploadContext, UploadWorker};
