//! Cloud Functions
//!
//! Listing and deleting (1st gen) Cloud Functions.

use super::client::GcpClient;
use super::operations::{self, PollSettings};
use anyhow::{Context, Result};
use serde_json::Value;

/// One listing of the project's functions
#[derive(Debug, Clone, Default)]
pub struct FunctionListing {
    pub functions: Vec<Value>,
    /// Regions the API could not reach; their functions are missing from `functions`
    pub unreachable: Vec<String>,
}

/// Result of paginated fetch
struct Page {
    items: Vec<Value>,
    unreachable: Vec<String>,
    next_token: Option<String>,
}

/// List functions in every region (auto-paginate)
pub async fn list_functions(client: &GcpClient) -> Result<FunctionListing> {
    let mut listing = FunctionListing::default();
    let mut page_token: Option<String> = None;

    loop {
        let page = list_functions_page(client, page_token.as_deref()).await?;
        listing.functions.extend(page.items);
        for region in page.unreachable {
            if !listing.unreachable.contains(&region) {
                listing.unreachable.push(region);
            }
        }

        if page.next_token.is_none() {
            break;
        }
        page_token = page.next_token;
    }

    tracing::info!(
        "Listed {} functions ({} unreachable regions)",
        listing.functions.len(),
        listing.unreachable.len()
    );

    Ok(listing)
}

async fn list_functions_page(client: &GcpClient, page_token: Option<&str>) -> Result<Page> {
    let url = client.functions_list_url();
    let query: Vec<(&str, &str)> = match page_token {
        Some(token) => vec![("pageToken", token)],
        None => Vec::new(),
    };

    let response = client
        .get_with_query(&url, &query)
        .await
        .context("Failed to list Cloud Functions")?;

    let items = response
        .get("functions")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let unreachable = response
        .get("unreachable")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(extract_short_name)
                .collect()
        })
        .unwrap_or_default();

    let next_token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(Page {
        items,
        unreachable,
        next_token,
    })
}

/// Delete a function and wait for the deletion to finish
pub async fn delete_function(
    client: &GcpClient,
    resource_name: &str,
    poll: PollSettings,
) -> Result<()> {
    let url = client.functions_url(resource_name);
    let operation = client.delete(&url).await?;
    operations::wait(client, operation, poll).await?;
    Ok(())
}

/// Extract short name from GCP resource name
/// e.g., "projects/my-project/locations/us-central1" -> "us-central1"
pub fn extract_short_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_short_name() {
        assert_eq!(
            extract_short_name("projects/p/locations/us-central1"),
            "us-central1"
        );
        assert_eq!(extract_short_name("europe-west1"), "europe-west1");
    }
}
