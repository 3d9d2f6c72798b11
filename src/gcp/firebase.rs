//! Firebase project configuration
//!
//! The Admin SDK config carries the project's default resource location,
//! which is also the location of its Cloud Scheduler jobs.

use super::client::GcpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Location used when the project has never picked one
pub const DEFAULT_APP_ENGINE_LOCATION: &str = "us-central1";

/// Firebase Admin SDK configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Default GCP resource location, e.g. `us-central` or `europe-west1`
    pub location_id: Option<String>,
}

impl From<&Value> for FirebaseConfig {
    fn from(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        Self {
            project_id: field("projectId").unwrap_or_default(),
            location_id: field("locationId"),
        }
    }
}

impl FirebaseConfig {
    /// App Engine location derived from the resource location
    ///
    /// Multi-region ids such as `us-central` and `europe-west` map to their
    /// first region (`us-central1`, `europe-west1`).
    pub fn app_engine_location(&self) -> String {
        match self.location_id.as_deref() {
            None => DEFAULT_APP_ENGINE_LOCATION.to_string(),
            Some(location) if location.ends_with(|c: char| c.is_ascii_digit()) => {
                location.to_string()
            }
            Some(location) => format!("{}1", location),
        }
    }
}

/// Fetch the Firebase config for the client's project
pub async fn get_config(client: &GcpClient) -> Result<FirebaseConfig> {
    let url = client.firebase_admin_sdk_config_url();
    let response = client
        .get(&url)
        .await
        .context("Failed to fetch Firebase project config")?;

    Ok(FirebaseConfig::from(&response))
}
