//! Delete Cloud Functions by name or group, together with the Cloud
//! Scheduler jobs and Pub/Sub topics that only exist to trigger them.

pub mod backend;
pub mod config;
pub mod delete;
pub mod error;
pub mod gcp;

pub use error::DeleteError;
