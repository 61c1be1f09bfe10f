//! Vikunja task event payload.
//!
//! Vikunja posts a JSON envelope of the form:
//!
//! ```json
//! {
//!   "event_name": "task.created",
//!   "time": "2024-09-03T10:00:00Z",
//!   "data": {
//!     "task": { "title": "...", "identifier": "ENG-12", ... },
//!     "doer": { "name": "...", "username": "..." }
//!   }
//! }
//! ```
//!
//! Every field carries a serde default so that sparse payloads still decode,
//! and an explicit `null` decodes to the same default.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

/// The only event name the relay acts on.
pub const TASK_CREATED: &str = "task.created";

/// Inbound task event as delivered by a Vikunja webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskEvent {
    /// Event name, e.g. `task.created`
    #[serde(deserialize_with = "null_as_default")]
    pub event_name: String,

    /// Opaque event timestamp
    #[serde(rename = "time", deserialize_with = "null_as_default")]
    pub occurred_at: String,

    /// Event body
    #[serde(deserialize_with = "null_as_default")]
    pub data: TaskEventData,
}

impl TaskEvent {
    /// Decode an event from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// The task the event refers to.
    pub fn task(&self) -> &Task {
        &self.data.task
    }

    /// The user who triggered the event.
    pub fn doer(&self) -> &Doer {
        &self.data.doer
    }

    /// Whether this is a task-created event.
    pub fn is_task_created(&self) -> bool {
        self.event_name == TASK_CREATED
    }
}

/// Body of a [`TaskEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskEventData {
    #[serde(deserialize_with = "null_as_default")]
    pub task: Task,
    #[serde(deserialize_with = "null_as_default")]
    pub doer: Doer,
}

/// Task fields used when formatting notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub due_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: i64,

    /// Project-scoped identifier such as `ENG-1234`
    #[serde(deserialize_with = "null_as_default")]
    pub identifier: String,
}

impl Task {
    /// Human readable due date.
    ///
    /// Vikunja sends `0001-01-01T00:00:00Z` for tasks without a due date; that
    /// and an empty string render as `None`. Values that are not RFC 3339 are
    /// returned unchanged.
    pub fn due_date_display(&self) -> String {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return "None".to_string();
        }

        match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => {
                let utc = parsed.with_timezone(&Utc);
                if utc.year() <= 1 {
                    "None".to_string()
                } else {
                    utc.format("%Y-%m-%d %H:%M UTC").to_string()
                }
            }
            Err(_) => raw.to_string(),
        }
    }
}

/// The user who triggered an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doer {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
}

impl Doer {
    /// Display name, falling back to the username when no name is set.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Decode `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
