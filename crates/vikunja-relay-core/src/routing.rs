//! # Project Routing Module
//!
//! Resolves the Discord channel and mention role for a task from the project
//! code embedded in its identifier (`ENG-1234` → `ENG`).
//!
//! The [`RoutingTable`] is loaded once at startup and is immutable afterwards.
//! It is shared between request handlers behind an `Arc` and needs no locking.

use crate::delivery::ChannelId;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, path::Path};
use tracing::{debug, warn};

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;

/// Separator between the project code and the task number.
pub const PROJECT_DELIMITER: char = '-';

// ============================================================================
// Identifiers
// ============================================================================

/// Project code prefix of a task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectCode(String);

impl ProjectCode {
    /// Extract the project code from a task identifier.
    ///
    /// The code is the substring strictly before the first
    /// [`PROJECT_DELIMITER`].
    ///
    /// # Errors
    /// - `RoutingError::MissingDelimiter` - the identifier has no delimiter
    pub fn from_identifier(identifier: &str) -> Result<Self, RoutingError> {
        match identifier.find(PROJECT_DELIMITER) {
            Some(index) => Ok(Self(identifier[..index].to_string())),
            None => Err(RoutingError::MissingDelimiter {
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discord role identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Discord role mention token, e.g. `<@&123>`
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Routing Table
// ============================================================================

/// Destination for a single project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    /// Channel the notification is posted to
    pub channel_id: ChannelId,

    /// Role mentioned in the notification; empty means no mention
    #[serde(default)]
    pub role_id: RoleId,
}

impl RoutingEntry {
    pub fn new(channel_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            channel_id: ChannelId::new(channel_id),
            role_id: RoleId::new(role_id),
        }
    }
}

/// Outcome of a successful routing lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub project: ProjectCode,
    pub channel_id: ChannelId,

    /// `None` when the entry carries no role
    pub role_id: Option<RoleId>,
}

/// Static mapping from project code to [`RoutingEntry`]
///
/// The on-disk format is a JSON object keyed by project code:
///
/// ```json
/// { "ENG": { "channel_id": "1280543736199123068", "role_id": "1280" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    entries: HashMap<String, RoutingEntry>,
}

impl RoutingTable {
    /// Build a table from `(project code, entry)` pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, RoutingEntry)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Load the table from a file path
    ///
    /// JSON is the primary format; `.yaml`/`.yml` files are parsed as YAML.
    ///
    /// # Errors
    /// - `RoutingError::FileNotFound` - Routing file missing
    /// - `RoutingError::ParseError` - Unreadable file or invalid syntax
    /// - `RoutingError::ValidationError` - Structurally invalid entries
    pub fn load_from_file(path: &Path) -> Result<Self, RoutingError> {
        if !path.exists() {
            return Err(RoutingError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| RoutingError::ParseError {
            path: path.display().to_string(),
            message: format!("Failed to read file: {}", e),
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let table: RoutingTable = match extension.to_lowercase().as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| RoutingError::ParseError {
                    path: path.display().to_string(),
                    message: format!("Invalid YAML: {}", e),
                })?
            }
            _ => serde_json::from_str(&contents).map_err(|e| RoutingError::ParseError {
                path: path.display().to_string(),
                message: format!("Invalid JSON: {}", e),
            })?,
        };

        table.validate()?;

        debug!(
            path = %path.display(),
            projects = table.len(),
            "Loaded routing table"
        );

        Ok(table)
    }

    /// Validate table structure
    ///
    /// Project codes must be non-empty and must not contain the delimiter,
    /// otherwise they could never match. Every entry needs a channel.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let mut errors = Vec::new();

        for (project, entry) in &self.entries {
            if project.is_empty() {
                errors.push("Empty project code".to_string());
            } else if project.contains(PROJECT_DELIMITER) {
                errors.push(format!(
                    "Project '{}': code must not contain '{}'",
                    project, PROJECT_DELIMITER
                ));
            }

            if entry.channel_id.is_empty() {
                errors.push(format!("Project '{}': channel_id is required", project));
            }
        }

        if !errors.is_empty() {
            errors.sort();
            return Err(RoutingError::ValidationError { errors });
        }

        Ok(())
    }

    /// Look up a project code (exact, case-sensitive).
    pub fn get(&self, project: &ProjectCode) -> Option<&RoutingEntry> {
        self.entries.get(project.as_str())
    }

    /// Resolve the route for a task identifier.
    ///
    /// # Errors
    /// - `RoutingError::MissingDelimiter` - no project code in the identifier
    /// - `RoutingError::NoRoute` - the project code has no entry
    pub fn resolve(&self, identifier: &str) -> Result<Route, RoutingError> {
        let project = ProjectCode::from_identifier(identifier)?;

        let entry = match self.get(&project) {
            Some(entry) => entry,
            None => {
                warn!(project = %project, identifier = %identifier, "No route for project");
                return Err(RoutingError::NoRoute { project });
            }
        };

        Ok(Route {
            channel_id: entry.channel_id.clone(),
            role_id: (!entry.role_id.is_empty()).then(|| entry.role_id.clone()),
            project,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Routing table errors
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Not from known project: identifier '{identifier}' has no project code")]
    MissingDelimiter { identifier: String },

    #[error("No route for project '{project}'")]
    NoRoute { project: ProjectCode },

    #[error("Routing file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse routing file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid routing table: {}", errors.join("; "))]
    ValidationError { errors: Vec<String> },
}

impl RoutingError {
    /// Whether the error means the task's project could not be routed.
    ///
    /// The remaining variants only occur while loading the table.
    pub fn is_unknown_project(&self) -> bool {
        matches!(self, Self::MissingDelimiter { .. } | Self::NoRoute { .. })
    }
}
