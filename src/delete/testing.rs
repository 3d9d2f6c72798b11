//! In-memory collaborators for exercising the delete flow

use crate::backend::{
    Backend, ConfigSource, FunctionResource, Inventory, ResourceDeleter, ScheduledTrigger,
    TopicBinding,
};
use crate::gcp::firebase::FirebaseConfig;
use crate::gcp::http::ApiError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn function(region: &str, id: &str) -> FunctionResource {
    FunctionResource::new("demo-project", region, id)
}

pub fn schedule_for(f: &FunctionResource) -> ScheduledTrigger {
    ScheduledTrigger {
        id: f.schedule_id(),
        project: f.project.clone(),
        target_service: f.target(),
    }
}

pub fn topic_for(f: &FunctionResource) -> TopicBinding {
    TopicBinding {
        id: f.schedule_id(),
        project: f.project.clone(),
        target_service: f.target(),
    }
}

/// The inventory used throughout the delete tests:
/// `group1.fnA` (us-central1) with a schedule, `group1.fnB` (europe-west1)
/// with a schedule and topic, `group2.fnC` (us-central1) with a topic.
pub fn sample_backend() -> Backend {
    let fn_a = function("us-central1", "group1.fnA");
    let fn_b = function("europe-west1", "group1.fnB");
    let fn_c = function("us-central1", "group2.fnC");

    Backend {
        schedules: vec![schedule_for(&fn_a), schedule_for(&fn_b)],
        topics: vec![topic_for(&fn_b), topic_for(&fn_c)],
        functions: vec![fn_a, fn_b, fn_c],
        unreachable_regions: Vec::new(),
    }
}

pub struct FakeInventory {
    pub backend: Option<Backend>,
    pub fetches: AtomicUsize,
}

impl FakeInventory {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: Some(backend),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            backend: None,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn fetch(&self, _project: &str) -> Result<Backend> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.backend
            .clone()
            .ok_or_else(|| ApiError::new(StatusCode::SERVICE_UNAVAILABLE).into())
    }
}

pub struct FakeConfig {
    pub location_id: Option<&'static str>,
    pub fail: bool,
}

impl FakeConfig {
    pub fn located(location_id: Option<&'static str>) -> Self {
        Self {
            location_id,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            location_id: None,
            fail: true,
        }
    }
}

#[async_trait]
impl ConfigSource for FakeConfig {
    async fn fetch_config(&self, project: &str) -> Result<FirebaseConfig> {
        if self.fail {
            return Err(ApiError::new(StatusCode::FORBIDDEN).into());
        }
        Ok(FirebaseConfig {
            project_id: project.to_string(),
            location_id: self.location_id.map(str::to_string),
            ..Default::default()
        })
    }
}

/// Records every delete call; fails or 404s the names it is told to
#[derive(Default)]
pub struct RecordingDeleter {
    pub calls: Mutex<Vec<String>>,
    pub fail: HashSet<String>,
    pub missing: HashSet<String>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingDeleter {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            fail: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn missing(names: &[&str]) -> Self {
        Self {
            missing: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn record(&self, call: String, name: &str) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.missing.contains(name) {
            return Err(ApiError::new(StatusCode::NOT_FOUND).into());
        }
        if self.fail.contains(name) {
            return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceDeleter for RecordingDeleter {
    async fn delete_function(&self, function: &FunctionResource) -> Result<()> {
        self.record(format!("function:{}", function.id), &function.id).await
    }

    async fn delete_schedule(&self, schedule: &ScheduledTrigger, location: &str) -> Result<()> {
        self.record(format!("schedule:{}@{}", schedule.id, location), &schedule.id)
            .await
    }

    async fn delete_topic(&self, topic: &TopicBinding) -> Result<()> {
        self.record(format!("topic:{}", topic.id), &topic.id).await
    }
}
