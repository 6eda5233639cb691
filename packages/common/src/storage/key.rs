use super::error::StorageError;

/// File-name prefix of in-progress uploads. Uploaded names can never start
/// with `.`, so staged keys cannot collide with a stored file.
pub const STAGING_PREFIX: &str = ".staging-";

/// Derive the object key for a file owned by `owner_id`.
///
/// The key is `{owner_id}/{name}`. It is also the uniqueness boundary for file
/// records, so two uploads of the same name by the same owner collide.
pub fn derive_object_key(owner_id: i32, name: &str) -> String {
    format!("{owner_id}/{name}")
}

/// A unique sibling of `key` for writing an upload before it is committed.
///
/// `42/a.pdf` stages as `42/.staging-{uuid}-a.pdf`.
pub fn staging_key(key: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match key.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/{STAGING_PREFIX}{id}-{name}"),
        None => format!("{STAGING_PREFIX}{id}-{key}"),
    }
}

/// Reject keys that could escape a store's namespace.
///
/// Keys are `/`-separated, relative, and every segment must be non-empty and
/// must not be `.` or `..`.
pub fn validate_object_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty".into()));
    }
    if key.contains('\0') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "key contains a forbidden character: {key:?}"
        )));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!("key is absolute: {key}")));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StorageError::InvalidKey(format!(
                "key has an invalid segment: {key}"
            )));
        }
    }
    Ok(())
}
