//! GCP-backed inventory, config and delete endpoints

use super::{Backend, ConfigSource, FunctionResource, Inventory, ResourceDeleter, ScheduledTrigger, TopicBinding};
use crate::gcp::client::GcpClient;
use crate::gcp::firebase::{self, FirebaseConfig};
use crate::gcp::functions;
use crate::gcp::operations::PollSettings;
use crate::gcp::{pubsub, scheduler};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Talks to the real APIs through one [`GcpClient`]
#[derive(Clone)]
pub struct GcpBackend {
    client: GcpClient,
    poll: PollSettings,
}

impl GcpBackend {
    pub fn new(client: GcpClient, poll: PollSettings) -> Self {
        Self { client, poll }
    }

    /// The client is bound to one project; refuse to act on another
    fn check_project(&self, project: &str) -> Result<()> {
        if project != self.client.project_id {
            anyhow::bail!(
                "Client is bound to project {} but {} was requested",
                self.client.project_id,
                project
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Inventory for GcpBackend {
    async fn fetch(&self, project: &str) -> Result<Backend> {
        self.check_project(project)?;
        let listing = functions::list_functions(&self.client).await?;
        Ok(Backend::from_listing(&listing))
    }
}

#[async_trait]
impl ConfigSource for GcpBackend {
    async fn fetch_config(&self, project: &str) -> Result<FirebaseConfig> {
        self.check_project(project)?;
        firebase::get_config(&self.client).await
    }
}

#[async_trait]
impl ResourceDeleter for GcpBackend {
    async fn delete_function(&self, function: &FunctionResource) -> Result<()> {
        tracing::info!(
            "Deleting function {} ({}, runtime {})",
            function.resource_name(),
            function.trigger,
            function.runtime.as_deref().unwrap_or("unknown")
        );
        functions::delete_function(&self.client, &function.resource_name(), self.poll)
            .await
            .with_context(|| format!("Failed to delete function {}", function.label()))
    }

    async fn delete_schedule(&self, schedule: &ScheduledTrigger, location: &str) -> Result<()> {
        tracing::info!("Deleting schedule {} in {}", schedule.id, location);
        scheduler::delete_job(&self.client, location, &schedule.id)
            .await
            .with_context(|| format!("Failed to delete schedule {}", schedule.id))
    }

    async fn delete_topic(&self, topic: &TopicBinding) -> Result<()> {
        tracing::info!("Deleting topic {}", topic.id);
        pubsub::delete_topic(&self.client, &topic.id)
            .await
            .with_context(|| format!("Failed to delete topic {}", topic.id))
    }
}
