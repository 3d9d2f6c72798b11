//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Base URLs of the APIs the client talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub functions: String,
    pub scheduler: String,
    pub pubsub: String,
    pub firebase: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            functions: "https://cloudfunctions.googleapis.com".to_string(),
            scheduler: "https://cloudscheduler.googleapis.com".to_string(),
            pubsub: "https://pubsub.googleapis.com".to_string(),
            firebase: "https://firebase.googleapis.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every API at the same origin (emulators, mock servers)
    pub fn all(base: &str) -> Self {
        Self {
            functions: base.to_string(),
            scheduler: base.to_string(),
            pubsub: base.to_string(),
            firebase: base.to_string(),
        }
    }

    /// Check every endpoint is an absolute http(s) URL and drop trailing slashes
    pub fn validated(self) -> Result<Self> {
        fn check(name: &str, raw: String) -> Result<String> {
            let url = Url::parse(&raw).with_context(|| format!("Invalid {} endpoint: {}", name, raw))?;
            if url.scheme() != "https" && url.scheme() != "http" {
                anyhow::bail!("Unsupported scheme for {} endpoint: {}", name, url.scheme());
            }
            Ok(raw.trim_end_matches('/').to_string())
        }

        Ok(Self {
            functions: check("functions", self.functions)?,
            scheduler: check("scheduler", self.scheduler)?,
            pubsub: check("pubsub", self.pubsub)?,
            firebase: check("firebase", self.firebase)?,
        })
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub project_id: String,
    pub endpoints: Endpoints,
}

impl GcpClient {
    /// Create a new GCP client using Application Default Credentials
    pub async fn new(project_id: &str, endpoints: Endpoints) -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_credentials(project_id, endpoints, credentials)
    }

    /// Create a client around already-built credentials
    pub fn with_credentials(
        project_id: &str,
        endpoints: Endpoints,
        credentials: GcpCredentials,
    ) -> Result<Self> {
        let http = GcpHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            project_id: project_id.to_string(),
            endpoints: endpoints.validated()?,
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.get_with_query(url, &[]).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token, query).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Cloud Functions API helpers
    // =========================================================================

    /// Build Cloud Functions v1 URL for a full resource or operation name
    pub fn functions_url(&self, name: &str) -> String {
        format!("{}/v1/{}", self.endpoints.functions, name)
    }

    /// Build the URL listing functions in every region of the project
    pub fn functions_list_url(&self) -> String {
        self.functions_url(&format!(
            "projects/{}/locations/-/functions",
            urlencoding::encode(&self.project_id)
        ))
    }

    // =========================================================================
    // Cloud Scheduler API helpers
    // =========================================================================

    /// Build Cloud Scheduler job URL
    pub fn scheduler_job_url(&self, location: &str, job: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/jobs/{}",
            self.endpoints.scheduler,
            urlencoding::encode(&self.project_id),
            urlencoding::encode(location),
            urlencoding::encode(job)
        )
    }

    // =========================================================================
    // Pub/Sub API helpers
    // =========================================================================

    /// Build Pub/Sub topic URL
    pub fn pubsub_topic_url(&self, topic: &str) -> String {
        format!(
            "{}/v1/projects/{}/topics/{}",
            self.endpoints.pubsub,
            urlencoding::encode(&self.project_id),
            urlencoding::encode(topic)
        )
    }

    // =========================================================================
    // Firebase Management API helpers
    // =========================================================================

    /// Build Firebase Admin SDK config URL
    pub fn firebase_admin_sdk_config_url(&self) -> String {
        format!(
            "{}/v1beta1/projects/{}/adminSdkConfig",
            self.endpoints.firebase,
            urlencoding::encode(&self.project_id)
        )
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    super::http::format_gcp_error(error)
}
