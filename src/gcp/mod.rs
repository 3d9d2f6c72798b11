//! GCP API interaction module
//!
//! Thin REST wrappers over the APIs a function deletion touches.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client and URL builders
//! - [`http`] - HTTP utilities for REST API calls
//! - [`functions`] - Cloud Functions listing and deletion
//! - [`operations`] - Long-running operation polling
//! - [`scheduler`] - Cloud Scheduler jobs
//! - [`pubsub`] - Pub/Sub topics
//! - [`firebase`] - Firebase project configuration
//!
//! # Example
//!
//! ```ignore
//! use crate::gcp::client::{Endpoints, GcpClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new("my-project", Endpoints::default()).await?;
//!     let listing = crate::gcp::functions::list_functions(&client).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod firebase;
pub mod functions;
pub mod http;
pub mod operations;
pub mod pubsub;
pub mod scheduler;

/// Whether a failed call means the resource is already gone
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<http::ApiError>()
            .is_some_and(http::ApiError::is_not_found)
            || cause
                .downcast_ref::<operations::OperationError>()
                .is_some_and(operations::OperationError::is_not_found)
    })
}
