//! The delete command
//!
//! Resolves filters against one inventory snapshot, plans the cascade,
//! gates it behind confirmation and runs it.
//!
//! # Module Structure
//!
//! - [`filter`] - Parsing filters and matching them against functions
//! - [`plan`] - Dependency resolution and the [`plan::DeletionPlan`]
//! - [`confirm`] - Confirmation gate and prompts
//! - [`executor`] - Cascading, bounded-concurrency deletion
//! - [`report`] - Per-resource outcomes
//!
//! # Example
//!
//! ```ignore
//! let mut prompt = TerminalPrompt::stdio(false);
//! let report = delete::run(&options, &backend, &backend, &backend, &mut prompt).await?;
//! report.print();
//! ```

pub mod confirm;
pub mod executor;
pub mod filter;
pub mod plan;
pub mod report;

#[cfg(test)]
mod testing;

use crate::backend::{ConfigSource, Inventory, ResourceDeleter};
use crate::error::DeleteError;
use confirm::Prompt;
use filter::Filter;
use plan::DeletionPlan;
use report::DeletionReport;

/// What the operator asked for
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub project: String,
    pub filters: Vec<String>,
    pub region: Option<String>,
    pub force: bool,
    pub concurrency: usize,
}

/// Where a delete operation is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Matched,
    DependenciesResolved,
    ConfirmationPending,
    Aborted,
    Executing,
    Completed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Aborted | Self::Completed)
    }

    fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Collecting, Matched)
                | (Matched, DependenciesResolved)
                | (DependenciesResolved, ConfirmationPending)
                | (ConfirmationPending, Aborted)
                | (ConfirmationPending, Executing)
                | (Executing, Completed)
        )
    }
}

/// Phase tracker for one operation
struct Progress {
    phase: Phase,
}

impl Progress {
    fn new() -> Self {
        tracing::debug!("phase: {:?}", Phase::Collecting);
        Self {
            phase: Phase::Collecting,
        }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::debug!("phase: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Run one delete operation
///
/// Returns the report when every resource was deleted; any failure comes
/// back as [`DeleteError::PartialFailure`] carrying the full report.
pub async fn run(
    options: &DeleteOptions,
    inventory: &dyn Inventory,
    config: &dyn ConfigSource,
    deleter: &dyn ResourceDeleter,
    prompt: &mut dyn Prompt,
) -> Result<DeletionReport, DeleteError> {
    let mut progress = Progress::new();
    let project = options.project.as_str();

    // Usage errors surface before anything is fetched
    let filters = Filter::parse_all(&options.filters)?;

    let (firebase_config, backend) = tokio::try_join!(
        async {
            config
                .fetch_config(project)
                .await
                .map_err(|source| DeleteError::Collaborator {
                    what: "Firebase config",
                    project: project.to_string(),
                    source,
                })
        },
        async {
            inventory
                .fetch(project)
                .await
                .map_err(|source| DeleteError::Collaborator {
                    what: "deployed functions",
                    project: project.to_string(),
                    source,
                })
        },
    )?;

    if !backend.unreachable_regions.is_empty() {
        tracing::warn!("Unreachable regions: {:?}", backend.unreachable_regions);
        eprintln!(
            "Warning: functions in these regions could not be listed and will not be deleted: {}",
            backend.unreachable_regions.join(", ")
        );
    }

    let matched = filter::match_functions(
        project,
        &backend.functions,
        &filters,
        options.region.as_deref(),
    )?;
    progress.advance(Phase::Matched);

    let plan = DeletionPlan::new(
        project,
        options.region.as_deref(),
        &firebase_config.app_engine_location(),
        matched,
        &backend,
    );
    progress.advance(Phase::DependenciesResolved);

    progress.advance(Phase::ConfirmationPending);
    if !confirm::confirm(&plan, options.force, prompt).await? {
        progress.advance(Phase::Aborted);
        return Err(DeleteError::Aborted);
    }

    progress.advance(Phase::Executing);
    let report = executor::delete_all(deleter, &plan, options.concurrency).await;
    progress.advance(Phase::Completed);
    debug_assert!(progress.phase.is_terminal());

    let failed = report.failed().count();
    if failed > 0 {
        return Err(DeleteError::PartialFailure {
            failed,
            total: report.total(),
            report,
        });
    }

    Ok(report)
}
