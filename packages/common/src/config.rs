use std::path::PathBuf;

use serde::Deserialize;

/// App-level MQ configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Whether MQ is enabled. Default: true.
    /// When disabled, upload events are dropped with a debug log.
    #[serde(default = "default_mq_enabled")]
    pub enabled: bool,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Durable work queue for "file.uploaded" events. Default: "file_upload_events".
    #[serde(default = "default_upload_event_queue")]
    pub upload_event_queue: String,
}

fn default_mq_enabled() -> bool {
    true
}
fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_upload_event_queue() -> String {
    "file_upload_events".into()
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_mq_enabled(),
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            upload_event_queue: default_upload_event_queue(),
        }
    }
}

/// Which object store implementation to build at startup.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Filesystem,
}

/// Object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Default: filesystem.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Bucket name (S3 only). Default: "documents".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Region name; with a custom endpoint this is passed through verbatim.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible servers such as MinIO.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style bucket addressing. Default: true (MinIO needs it).
    #[serde(default = "default_path_style")]
    pub path_style: bool,
    /// Root directory for the filesystem backend. Default: "./data/objects".
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Base URL that serves `data_dir` (filesystem backend download links).
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Per-file size limit in bytes. Default: 64 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Filesystem
}
fn default_bucket() -> String {
    "documents".into()
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_path_style() -> bool {
    true
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/objects")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/objects".into()
}
fn default_max_file_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: default_path_style(),
            data_dir: default_data_dir(),
            public_base_url: default_public_base_url(),
            max_file_size: default_max_file_size(),
        }
    }
}
