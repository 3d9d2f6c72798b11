//! Cloud Scheduler

use super::client::GcpClient;
use anyhow::Result;

/// Delete a Cloud Scheduler job
pub async fn delete_job(client: &GcpClient, location: &str, job: &str) -> Result<()> {
    let url = client.scheduler_job_url(location, job);
    client.delete(&url).await?;
    Ok(())
}
