//! Filter matching
//!
//! A filter is a dot-delimited group path. `group1` selects every function
//! in `group1`, `group1.fnA` selects exactly that function.

use crate::backend::FunctionResource;
use crate::error::DeleteError;

/// A parsed filter: its non-empty path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    segments: Vec<String>,
}

impl Filter {
    /// Parse a user-supplied filter string
    pub fn parse(raw: &str) -> Result<Self, DeleteError> {
        let invalid = |reason| DeleteError::InvalidFilter {
            filter: raw.to_string(),
            reason,
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("filter is empty"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty group segment"));
            }
            // Deployed ids join groups with '-', so "group1-fnA" names the same path
            for part in segment.split('-') {
                if part.is_empty() {
                    return Err(invalid("empty group segment"));
                }
                segments.push(part.to_string());
            }
        }

        Ok(Self { segments })
    }

    /// Parse every filter; at least one is required
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>, DeleteError> {
        if raw.is_empty() {
            return Err(DeleteError::NoFilters);
        }
        raw.iter().map(|f| Self::parse(f.as_ref())).collect()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the filter is a segment prefix of the function's group path
    pub fn matches(&self, function: &FunctionResource) -> bool {
        let function_segments = function.segments();
        self.segments.len() <= function_segments.len()
            && self
                .segments
                .iter()
                .zip(function_segments)
                .all(|(filter, name)| filter == name)
    }
}

/// Select the functions matched by any filter and, when given, in `region`
///
/// An empty selection is an error: nothing is ever deleted silently.
pub fn match_functions(
    project: &str,
    inventory: &[FunctionResource],
    filters: &[Filter],
    region: Option<&str>,
) -> Result<Vec<FunctionResource>, DeleteError> {
    if filters.is_empty() {
        return Err(DeleteError::NoFilters);
    }

    let matched: Vec<FunctionResource> = inventory
        .iter()
        .filter(|func| region.map_or(true, |r| func.region == r))
        .filter(|func| filters.iter().any(|f| f.matches(func)))
        .cloned()
        .collect();

    if matched.is_empty() {
        return Err(DeleteError::NoMatch {
            project: project.to_string(),
        });
    }

    tracing::debug!(
        "{} of {} functions matched {} filters (region: {})",
        matched.len(),
        inventory.len(),
        filters.len(),
        region.unwrap_or("any")
    );

    Ok(matched)
}
