mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use key::{STAGING_PREFIX, derive_object_key, staging_key, validate_object_key};
pub use traits::{BoxReader, ObjectStore};
