//! Cascading deleter
//!
//! Each function is deleted after its schedules and topics, so nothing is
//! left pointing at a function that no longer exists. Functions are
//! independent of each other: one failing never stops the rest.

use super::plan::DeletionPlan;
use super::report::{DeletionOutcome, DeletionReport, OutcomeStatus, ResourceKind};
use crate::backend::{FunctionResource, ResourceDeleter};
use futures::future::join_all;
use tokio::sync::Semaphore;

/// Functions deleted in parallel unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Delete everything in `plan`, at most `concurrency` functions at a time
pub async fn delete_all(
    deleter: &dyn ResourceDeleter,
    plan: &DeletionPlan,
    concurrency: usize,
) -> DeletionReport {
    let permits = permits_for(concurrency, plan.functions.len());
    let semaphore = Semaphore::new(permits);

    tracing::info!(
        "Deleting {} resources: {} functions, {} schedules, {} topics (region: {}, concurrency {})",
        plan.resource_count(),
        plan.functions.len(),
        plan.schedules.len(),
        plan.topics.len(),
        plan.region.as_deref().unwrap_or("any"),
        permits
    );

    let per_function = join_all(
        plan.functions
            .iter()
            .map(|function| delete_cascade(deleter, plan, function, &semaphore)),
    )
    .await;

    DeletionReport {
        outcomes: per_function.into_iter().flatten().collect(),
    }
}

/// At least one permit, never more than there are functions to delete
fn permits_for(concurrency: usize, functions: usize) -> usize {
    concurrency
        .min(functions)
        .min(Semaphore::MAX_PERMITS)
        .max(1)
}

/// Delete one function's dependents, then the function
async fn delete_cascade(
    deleter: &dyn ResourceDeleter,
    plan: &DeletionPlan,
    function: &FunctionResource,
    semaphore: &Semaphore,
) -> Vec<DeletionOutcome> {
    let Ok(_permit) = semaphore.acquire().await else {
        return vec![DeletionOutcome::new(
            ResourceKind::Function,
            function.label(),
            OutcomeStatus::Skipped("deletion was cancelled".to_string()),
        )];
    };

    let (schedules, topics) = plan.dependents_of(function);
    let location = plan.app_engine_location.as_str();

    let schedule_deletes = join_all(schedules.into_iter().map(|schedule| async move {
        DeletionOutcome::from_result(
            ResourceKind::Schedule,
            schedule.id.clone(),
            deleter.delete_schedule(schedule, location).await,
        )
    }));
    let topic_deletes = join_all(topics.into_iter().map(|topic| async move {
        DeletionOutcome::from_result(
            ResourceKind::Topic,
            topic.id.clone(),
            deleter.delete_topic(topic).await,
        )
    }));

    let (mut outcomes, topic_outcomes) = tokio::join!(schedule_deletes, topic_deletes);
    outcomes.extend(topic_outcomes);

    let function_outcome = match outcomes.iter().find(|o| !o.status.is_success()) {
        Some(blocker) => {
            tracing::warn!(
                "Not deleting {}: its {} {} is still in place",
                function.label(),
                blocker.kind,
                blocker.name
            );
            DeletionOutcome::new(
                ResourceKind::Function,
                function.label(),
                OutcomeStatus::Skipped(format!(
                    "its {} {} could not be deleted",
                    blocker.kind, blocker.name
                )),
            )
        }
        None => DeletionOutcome::from_result(
            ResourceKind::Function,
            function.label(),
            deleter.delete_function(function).await,
        ),
    };

    outcomes.push(function_outcome);
    outcomes
}
