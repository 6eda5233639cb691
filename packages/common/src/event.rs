use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message published to a work queue.
pub trait Event: Serialize + Send + Sync {
    /// Event kind carried on the wire (e.g. "file.uploaded").
    fn topic(&self) -> &str;

    /// Serialize into the queue payload.
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Published once per successfully ingested file.
///
/// Delivery is at-most-once from the publisher's side: a failed publish is
/// logged and dropped, the upload it describes stays committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadedEvent {
    pub event: String,
    pub file_id: i32,
    pub object_key: String,
    pub timestamp: DateTime<Utc>,
}

impl FileUploadedEvent {
    pub const KIND: &'static str = "file.uploaded";

    pub fn new(file_id: i32, object_key: impl Into<String>) -> Self {
        Self {
            event: Self::KIND.to_string(),
            file_id,
            object_key: object_key.into(),
            timestamp: Utc::now(),
        }
    }
}

impl Event for FileUploadedEvent {
    fn topic(&self) -> &str {
        &self.event
    }
}
