//! Errors of the delete command

use crate::delete::report::DeletionReport;

/// Why a delete command did not fully succeed
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("Must supply at least one function or group name.")]
    NoFilters,

    #[error("Invalid filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: &'static str },

    #[error("The specified filters do not match any existing functions in project {project}.")]
    NoMatch { project: String },

    #[error("Pass --force to delete functions in non-interactive mode.")]
    ConfirmationRequired,

    #[error("Command aborted.")]
    Aborted,

    #[error("Failed to read confirmation")]
    Prompt(#[from] std::io::Error),

    #[error("Failed to load {what} for project {project}")]
    Collaborator {
        what: &'static str,
        project: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{failed} of {total} resources could not be deleted")]
    PartialFailure {
        failed: usize,
        total: usize,
        report: DeletionReport,
    },
}

impl DeleteError {
    /// Errors caused by how the command was invoked
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::NoFilters
                | Self::InvalidFilter { .. }
                | Self::NoMatch { .. }
                | Self::ConfirmationRequired
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            2
        } else {
            1
        }
    }

    /// Report of the deletions that did run, if any did
    pub fn report(&self) -> Option<&DeletionReport> {
        match self {
            Self::PartialFailure { report, .. } => Some(report),
            _ => None,
        }
    }
}
