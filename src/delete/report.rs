//! Per-resource outcomes of a delete command

use crate::gcp::{self, client::format_gcp_error};
use crossterm::style::Stylize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Function,
    Schedule,
    Topic,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "function",
            Self::Schedule => "schedule",
            Self::Topic => "topic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Deleted,
    /// The delete call reported not-found; counts as success
    AlreadyAbsent,
    Failed(String),
    /// Never attempted
    Skipped(String),
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted | Self::AlreadyAbsent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub kind: ResourceKind,
    pub name: String,
    pub status: OutcomeStatus,
}

impl DeletionOutcome {
    pub fn new(kind: ResourceKind, name: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            kind,
            name: name.into(),
            status,
        }
    }

    /// Classify the result of a delete call
    pub fn from_result(kind: ResourceKind, name: impl Into<String>, result: anyhow::Result<()>) -> Self {
        let name = name.into();
        let status = match result {
            Ok(()) => OutcomeStatus::Deleted,
            Err(e) if gcp::is_not_found(&e) => {
                tracing::info!("{} {} was already deleted", kind, name);
                OutcomeStatus::AlreadyAbsent
            }
            Err(e) => {
                tracing::error!("Failed to delete {} {}: {:#}", kind, name, e);
                OutcomeStatus::Failed(format_gcp_error(&e))
            }
        };
        Self { kind, name, status }
    }

    /// One line of the summary, unstyled
    pub fn describe(&self) -> String {
        match &self.status {
            OutcomeStatus::Deleted => format!("Deleted {} {}", self.kind, self.name),
            OutcomeStatus::AlreadyAbsent => {
                format!("Deleted {} {} (already gone)", self.kind, self.name)
            }
            OutcomeStatus::Failed(cause) => {
                format!("Failed to delete {} {}: {}", self.kind, self.name, cause)
            }
            OutcomeStatus::Skipped(cause) => {
                format!("Skipped {} {}: {}", self.kind, self.name, cause)
            }
        }
    }
}

/// Outcomes of one delete command, in plan order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    pub fn outcome(&self, kind: ResourceKind, name: &str) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|o| o.kind == kind && o.name == name)
            .map(|o| &o.status)
    }

    pub fn totals_line(&self) -> String {
        format!(
            "{} deleted, {} failed",
            self.succeeded().count(),
            self.failed().count()
        )
    }

    /// Print the summary to stdout
    pub fn print(&self) {
        for outcome in &self.outcomes {
            let mark = if outcome.status.is_success() {
                "✔".green()
            } else {
                "✖".red()
            };
            println!("{} {}", mark, outcome.describe());
        }
        println!("{}", self.totals_line().bold());
    }
}
