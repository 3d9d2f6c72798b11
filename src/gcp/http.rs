//! HTTP utilities for GCP REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A GCP API call that returned a non-success status
#[derive(Debug, Clone, thiserror::Error)]
#[error("API request failed: {status}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
pub struct ApiError {
    pub status: StatusCode,
    /// `error.message` from the Google error envelope, when present
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
        }
    }

    /// Build from a response body, picking the message out of `{"error": {"message": ...}}`
    fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.chars().take(120).collect::<String>())
        });
        Self { status, message }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gcf-delete/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str, query: &[(&str, &str)]) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let request = self.client.get(url).bearer_auth(token).query(query);
        Self::send(request).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);

        let request = self.client.delete(url).bearer_auth(token);
        Self::send(request).await
    }

    async fn send(request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the sanitized/truncated body goes to the log
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_body(status, &body).into());
        }

        // Handle empty response
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Find the [`ApiError`] in an error chain, if the failure came from the API
pub fn api_error(error: &anyhow::Error) -> Option<&ApiError> {
    error.chain().find_map(|cause| cause.downcast_ref::<ApiError>())
}

/// Longest non-API error message shown to the user
const MAX_ERROR_CHARS: usize = 160;

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    let Some(api) = api_error(error) else {
        // Truncate long error messages and drop control characters
        let error_str = format!("{:#}", error);
        let mut chars = error_str.chars().filter(|c| !c.is_control());
        let sanitized = chars.by_ref().take(MAX_ERROR_CHARS).collect::<String>();
        return if chars.next().is_some() {
            format!("{}...", sanitized)
        } else {
            sanitized
        };
    };

    let hint = match api.status.as_u16() {
        403 => "Permission denied. Check your GCP IAM permissions.",
        401 => "Authentication failed. Run 'gcloud auth application-default login'.",
        404 => "Resource not found.",
        429 => "Rate limit exceeded. Please try again later.",
        400 => "Invalid request.",
        409 => "Resource conflict. The resource may be in use by another operation.",
        500 | 503 => "GCP service temporarily unavailable. Please try again.",
        _ => "Request failed.",
    };

    match &api.message {
        Some(message) => format!("{} {}", hint, message),
        None => hint.to_string(),
    }
}
