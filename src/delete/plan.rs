//! Dependency resolution and the deletion plan

use crate::backend::{Backend, FunctionRef, FunctionResource, ScheduledTrigger, TopicBinding};

/// Schedules and topics that target one of `matched`
///
/// Dependents of unselected functions, and orphans whose target is not in
/// the inventory at all, are left out.
pub fn resolve_dependents(
    matched: &[FunctionResource],
    schedules: &[ScheduledTrigger],
    topics: &[TopicBinding],
) -> (Vec<ScheduledTrigger>, Vec<TopicBinding>) {
    let targets_selected = |target: &FunctionRef| matched.iter().any(|func| func.is(target));

    let schedules = schedules
        .iter()
        .filter(|schedule| targets_selected(&schedule.target_service))
        .cloned()
        .collect();
    let topics = topics
        .iter()
        .filter(|topic| targets_selected(&topic.target_service))
        .cloned()
        .collect();

    (schedules, topics)
}

/// Everything one delete command will remove
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    pub project: String,
    pub region: Option<String>,
    /// Location of the project's Cloud Scheduler jobs
    pub app_engine_location: String,
    pub functions: Vec<FunctionResource>,
    pub schedules: Vec<ScheduledTrigger>,
    pub topics: Vec<TopicBinding>,
}

impl DeletionPlan {
    /// Plan the deletion of `matched` and their dependents in `backend`
    ///
    /// `backend` must be the snapshot `matched` was selected from.
    pub fn new(
        project: &str,
        region: Option<&str>,
        app_engine_location: &str,
        matched: Vec<FunctionResource>,
        backend: &Backend,
    ) -> Self {
        let (schedules, topics) = resolve_dependents(&matched, &backend.schedules, &backend.topics);

        Self {
            project: project.to_string(),
            region: region.map(str::to_string),
            app_engine_location: app_engine_location.to_string(),
            functions: matched,
            schedules,
            topics,
        }
    }

    /// Dependents of one function in the plan
    pub fn dependents_of(
        &self,
        function: &FunctionResource,
    ) -> (Vec<&ScheduledTrigger>, Vec<&TopicBinding>) {
        let schedules = self
            .schedules
            .iter()
            .filter(|s| function.is(&s.target_service))
            .collect();
        let topics = self
            .topics
            .iter()
            .filter(|t| function.is(&t.target_service))
            .collect();
        (schedules, topics)
    }

    /// Number of resources the plan deletes
    pub fn resource_count(&self) -> usize {
        self.functions.len() + self.schedules.len() + self.topics.len()
    }
}
