//! Pub/Sub

use super::client::GcpClient;
use anyhow::Result;

/// Delete a Pub/Sub topic
pub async fn delete_topic(client: &GcpClient, topic: &str) -> Result<()> {
    let url = client.pubsub_topic_url(topic);
    client.delete(&url).await?;
    Ok(())
}
