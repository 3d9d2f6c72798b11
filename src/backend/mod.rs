//! Deployed backend model
//!
//! A [`Backend`] is one snapshot of what is deployed in a project: the
//! functions, plus the Cloud Scheduler jobs and Pub/Sub topics that exist
//! only to trigger them.
//!
//! # Architecture
//!
//! - [`gcp`] - [`Inventory`], [`ConfigSource`] and [`ResourceDeleter`]
//!   backed by the GCP REST APIs
//!
//! The traits are the seams the deletion flow is written against, so the
//! flow can run against the real APIs or against test doubles.

pub mod gcp;

use crate::gcp::firebase::FirebaseConfig;
use crate::gcp::functions::{extract_short_name, FunctionListing};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Label marking a function deployed with a schedule trigger
pub const SCHEDULED_LABEL: &str = "deployment-scheduled";

/// Identity of a function: what dependents point at
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionRef {
    pub project: String,
    pub region: String,
    pub id: String,
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.id, self.region)
    }
}

/// How a function is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    Https,
    Event { event_type: String },
    Scheduled,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Https => write!(f, "https"),
            TriggerKind::Event { event_type } => write!(f, "event {}", event_type),
            TriggerKind::Scheduled => write!(f, "scheduled"),
        }
    }
}

/// A deployed function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResource {
    pub id: String,
    pub region: String,
    pub project: String,
    pub runtime: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub trigger: TriggerKind,
}

impl FunctionResource {
    pub fn new(project: &str, region: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            region: region.to_string(),
            project: project.to_string(),
            runtime: None,
            labels: BTreeMap::new(),
            trigger: TriggerKind::Https,
        }
    }

    /// Parse a Cloud Functions v1 `CloudFunction` resource
    ///
    /// Returns `None` when the `name` is not a full function resource name.
    pub fn from_api(value: &Value) -> Option<Self> {
        let name = value.get("name").and_then(|v| v.as_str())?;
        let parts: Vec<&str> = name.split('/').collect();
        let ["projects", project, "locations", region, "functions", id] = parts.as_slice() else {
            tracing::warn!("Skipping function with unexpected name: {}", name);
            return None;
        };

        let labels: BTreeMap<String, String> = value
            .get("labels")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let trigger = if labels.get(SCHEDULED_LABEL).map(String::as_str) == Some("true") {
            TriggerKind::Scheduled
        } else if let Some(event) = value.get("eventTrigger") {
            TriggerKind::Event {
                event_type: event
                    .get("eventType")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-")
                    .to_string(),
            }
        } else {
            TriggerKind::Https
        };

        Some(Self {
            id: id.to_string(),
            region: region.to_string(),
            project: project.to_string(),
            runtime: value
                .get("runtime")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            labels,
            trigger,
        })
    }

    pub fn target(&self) -> FunctionRef {
        FunctionRef {
            project: self.project.clone(),
            region: self.region.clone(),
            id: self.id.clone(),
        }
    }

    /// Whether `target` names this function
    pub fn is(&self, target: &FunctionRef) -> bool {
        self.id == target.id && self.region == target.region && self.project == target.project
    }

    /// Short label used in prompts and reports
    pub fn label(&self) -> String {
        format!("{}({})", self.id, self.region)
    }

    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/functions/{}",
            self.project, self.region, self.id
        )
    }

    /// Group path of the function id
    ///
    /// Grouped functions deploy as `group-name`; ids written with dots
    /// decompose the same way.
    pub fn segments(&self) -> Vec<&str> {
        self.id.split(['-', '.']).collect()
    }

    /// Name shared by the scheduler job and topic of a scheduled function
    pub fn schedule_id(&self) -> String {
        format!("firebase-schedule-{}-{}", self.id, self.region)
    }
}

/// A Cloud Scheduler job invoking one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTrigger {
    pub id: String,
    pub project: String,
    pub target_service: FunctionRef,
}

/// A Pub/Sub topic whose messages trigger one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBinding {
    pub id: String,
    pub project: String,
    pub target_service: FunctionRef,
}

/// Snapshot of everything deployed in a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backend {
    pub functions: Vec<FunctionResource>,
    pub schedules: Vec<ScheduledTrigger>,
    pub topics: Vec<TopicBinding>,
    pub unreachable_regions: Vec<String>,
}

impl Backend {
    /// Build a snapshot from a function listing
    ///
    /// Every scheduled function contributes the scheduler job and topic
    /// that were created for it at deploy time.
    pub fn from_listing(listing: &FunctionListing) -> Self {
        let mut functions = Vec::new();
        let mut schedules = Vec::new();
        let mut topics = Vec::new();

        for raw in &listing.functions {
            let Some(func) = FunctionResource::from_api(raw) else {
                continue;
            };
            if func.trigger != TriggerKind::Scheduled {
                functions.push(func);
                continue;
            }

            let id = func.schedule_id();
            // The topic the scheduler publishes to is the function's event resource
            let topic_id = raw
                .get("eventTrigger")
                .and_then(|e| e.get("resource"))
                .and_then(|v| v.as_str())
                .map(extract_short_name)
                .unwrap_or_else(|| id.clone());

            schedules.push(ScheduledTrigger {
                id,
                project: func.project.clone(),
                target_service: func.target(),
            });
            topics.push(TopicBinding {
                id: topic_id,
                project: func.project.clone(),
                target_service: func.target(),
            });
            functions.push(func);
        }

        Self {
            functions,
            schedules,
            topics,
            unreachable_regions: listing.unreachable.clone(),
        }
    }
}

/// Source of the deployed backend snapshot
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn fetch(&self, project: &str) -> Result<Backend>;
}

/// Source of the Firebase project configuration
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch_config(&self, project: &str) -> Result<FirebaseConfig>;
}

/// Delete endpoints for each resource kind
///
/// Errors keep the API error in their chain so a not-found can be told
/// apart from a real failure (see [`crate::gcp::is_not_found`]).
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    async fn delete_function(&self, function: &FunctionResource) -> Result<()>;
    async fn delete_schedule(&self, schedule: &ScheduledTrigger, location: &str) -> Result<()>;
    async fn delete_topic(&self, topic: &TopicBinding) -> Result<()>;
}
