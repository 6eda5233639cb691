use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Key-addressed object storage.
///
/// Handles are long-lived and shared by every concurrent upload, so
/// implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(key, reader, data.len() as u64, content_type)
            .await
    }

    /// Stream `size` declared bytes from `reader` under `key`.
    ///
    /// Returns the number of bytes stored.
    async fn put_stream(
        &self,
        key: &str,
        reader: BoxReader,
        size: u64,
        content_type: &str,
    ) -> Result<u64, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Move the object at `from` to `to`, replacing anything at `to`.
    ///
    /// `NotFound` if `from` does not exist.
    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Delete the object at `key`. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Produce a time-limited URL that downloads the object without credentials.
    async fn presigned_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, StorageError>;
}
