use broccoli_queue::queue::BroccoliQueue;
use common::Event;
use tracing::debug;

use crate::error::MqError;

pub type MqQueue = BroccoliQueue;

pub struct MqConfig {
    pub url: String,
    pub pool_size: u8,
}

pub async fn init_mq(config: MqConfig) -> Result<MqQueue, MqError> {
    BroccoliQueue::builder(&config.url)
        .pool_connections(config.pool_size)
        .build()
        .await
        .map_err(MqError::from)
}

/// Publish a typed event onto a durable work queue as JSON.
pub async fn publish_event<E: Event>(
    queue: &MqQueue,
    queue_name: &str,
    event: &E,
) -> Result<(), MqError> {
    let payload = event.to_payload()?;
    queue.publish(queue_name, None, &payload, None).await?;
    debug!(queue = queue_name, topic = event.topic(), "Event published");
    Ok(())
}
