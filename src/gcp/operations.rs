//! Long-running operations
//!
//! Cloud Functions mutations return an `Operation` that has to be polled
//! until `done` before the outcome is known.

use super::client::GcpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::{Duration, Instant};

/// gRPC status code carried by operations whose target no longer exists
const GRPC_NOT_FOUND: i64 = 5;

/// How often and how long to poll an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// An operation that finished with an `error` status
#[derive(Debug, Clone, thiserror::Error)]
#[error("operation {name} failed: {message} (code {code})")]
pub struct OperationError {
    pub name: String,
    pub code: i64,
    pub message: String,
}

impl OperationError {
    pub fn is_not_found(&self) -> bool {
        self.code == GRPC_NOT_FOUND
    }

    fn from_operation(name: &str, error: &Value) -> Self {
        Self {
            name: name.to_string(),
            code: error.get("code").and_then(|v| v.as_i64()).unwrap_or(0),
            message: error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

/// Wait for an operation returned by a mutation to complete
///
/// A response without a `name` is treated as already complete.
pub async fn wait(client: &GcpClient, operation: Value, poll: PollSettings) -> Result<Value> {
    let Some(name) = operation
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return Ok(operation);
    };

    let started = Instant::now();
    let mut current = operation;
    let mut polls = 0u32;

    loop {
        if current.get("done").and_then(|v| v.as_bool()).unwrap_or(false) {
            if let Some(error) = current.get("error") {
                return Err(OperationError::from_operation(&name, error).into());
            }
            tracing::debug!("Operation {} done after {} polls", name, polls);
            return Ok(current.get("response").cloned().unwrap_or(Value::Null));
        }

        if started.elapsed() >= poll.timeout {
            anyhow::bail!(
                "Timed out after {}s waiting for operation {}",
                poll.timeout.as_secs(),
                name
            );
        }

        tokio::time::sleep(poll.interval).await;
        polls += 1;
        current = client
            .get(&client.functions_url(&name))
            .await
            .with_context(|| format!("Failed to poll operation {}", name))?;
    }
}
