use std::sync::Arc;

use async_trait::async_trait;
use common::FileUploadedEvent;
use mq::{Mq, MqError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ports::EventPublisher;
use crate::entity::file;

/// Publishes upload events through the shared broccoli queue.
pub struct MqEventPublisher {
    mq: Arc<Mq>,
}

impl MqEventPublisher {
    pub fn new(mq: Arc<Mq>) -> Self {
        Self { mq }
    }
}

#[async_trait]
impl EventPublisher for MqEventPublisher {
    async fn publish(&self, queue: &str, event: &FileUploadedEvent) -> Result<(), MqError> {
        mq::publish_event(&self.mq, queue, event).await
    }
}

/// Fire-and-forget "file.uploaded" notifications.
#[derive(Clone)]
pub struct EventNotifier {
    publisher: Option<Arc<dyn EventPublisher>>,
    queue: String,
}

impl EventNotifier {
    pub fn new(publisher: Arc<dyn EventPublisher>, queue: impl Into<String>) -> Self {
        Self {
            publisher: Some(publisher),
            queue: queue.into(),
        }
    }

    /// A notifier that drops every event (MQ disabled).
    pub fn disabled() -> Self {
        Self {
            publisher: None,
            queue: String::new(),
        }
    }

    /// Publish an event for `record` on a detached task.
    ///
    /// The caller never waits on the handle in production; tests do. A failed
    /// publish is logged and dropped.
    pub fn notify_uploaded(&self, record: &file::Model) -> Option<JoinHandle<()>> {
        let Some(publisher) = self.publisher.clone() else {
            debug!(file_id = record.id, "MQ unavailable, skipping upload event");
            return None;
        };

        let queue = self.queue.clone();
        let event = FileUploadedEvent::new(record.id, record.object_key.clone());

        Some(tokio::spawn(async move {
            match publisher.publish(&queue, &event).await {
                Ok(()) => info!(
                    file_id = event.file_id,
                    object_key = %event.object_key,
                    "Upload event published"
                ),
                Err(e) => warn!(
                    file_id = event.file_id,
                    object_key = %event.object_key,
                    error = %e,
                    "Failed to publish upload event"
                ),
            }
        }))
    }
}
