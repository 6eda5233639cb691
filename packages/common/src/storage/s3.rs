use std::time::Duration;

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tracing::{debug, warn};

use super::error::StorageError;
use super::key::validate_object_key;
use super::traits::{BoxReader, ObjectStore};
use crate::config::StorageConfig;

/// S3-compatible object store (AWS S3, MinIO, ...).
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

impl S3ObjectStore {
    /// Build a bucket handle from configuration.
    ///
    /// A configured `endpoint` selects a custom region (MinIO and friends);
    /// otherwise `region` must name an AWS region.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let region = match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.to_string(),
            },
            _ => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(backend)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            max_size: config.max_file_size,
        })
    }
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        size: u64,
        content_type: &str,
    ) -> Result<u64, StorageError> {
        validate_object_key(key)?;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        self.bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(backend)?;

        debug!(key, size, "Object uploaded to S3");
        Ok(size)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_object_key(key)?;
        match self.bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        validate_object_key(from)?;
        validate_object_key(to)?;
        match self.bucket.copy_object_internal(from, to).await {
            Ok(404) | Err(S3Error::HttpFailWithBody(404, _)) => {
                return Err(StorageError::NotFound(from.to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(backend(e)),
        }

        // The copy is already in place; a leftover source is only garbage.
        if let Err(e) = self.bucket.delete_object(from).await {
            warn!(from, to, error = %e, "Failed to remove renamed source object");
        }
        debug!(from, to, "Object renamed in S3");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_object_key(key)?;
        match self.bucket.delete_object(key).await {
            Ok(_) | Err(S3Error::HttpFailWithBody(404, _)) => Ok(()),
            Err(e) => Err(backend(e)),
        }
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        validate_object_key(key)?;
        let expiry_secs = u32::try_from(ttl.as_secs())
            .map_err(|_| StorageError::Backend(format!("ttl too large: {ttl:?}")))?;

        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(backend)
    }
}
