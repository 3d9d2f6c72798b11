//! Configuration Management
//!
//! Optional configuration file for gcf-delete.

use crate::delete::executor::DEFAULT_CONCURRENCY;
use crate::gcp::client::Endpoints;
use crate::gcp::operations::PollSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Operations are never polled more often than this
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Project used when `--project` is not given
    #[serde(default)]
    pub project_id: Option<String>,
    /// Functions deleted in parallel
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub operation_poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub operation_timeout_secs: Option<u64>,
    /// API base URL overrides (emulators, private endpoints)
    #[serde(default)]
    pub endpoints: Option<Endpoints>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcf-delete").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.project_id.clone())
            .or_else(crate::gcp::auth::get_default_project)
    }

    /// Get effective concurrency (CLI > config > default)
    pub fn effective_concurrency(&self, cli: Option<usize>) -> usize {
        cli.or(self.concurrency).unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }

    pub fn poll_settings(&self) -> PollSettings {
        let defaults = PollSettings::default();
        PollSettings {
            interval: self
                .operation_poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval)
                .max(MIN_POLL_INTERVAL),
            timeout: self
                .operation_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints.clone().unwrap_or_default()
    }
}
