pub mod config;
pub mod event;
pub mod storage;

pub use config::{MqAppConfig, StorageBackend, StorageConfig};
pub use event::{Event, FileUploadedEvent};
