//! Notification text formatting.

use crate::{event::TaskEvent, routing::RoleId};
use std::fmt::Write;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

/// Discord rejects message content longer than this many characters.
pub const MAX_CONTENT_LENGTH: usize = 2000;

const TRUNCATION_MARKER: &str = "...";

/// Format the notification for a task-created event.
///
/// When a role is given its mention token leads the message so Discord
/// pings the role.
pub fn format_task_created(event: &TaskEvent, role: Option<&RoleId>) -> String {
    let task = event.task();
    let mut message = String::new();

    if let Some(role) = role {
        let _ = writeln!(message, "{}", role.mention());
    }

    let _ = write!(
        message,
        "**New Task Created**\n\n\
         **Title:** {}\n\
         **Description:** {}\n\
         **Due Date:** {}\n\
         **Priority:** {}\n\
         **Identifier:** {}\n\
         **Created By:** {}",
        task.title,
        task.description,
        task.due_date_display(),
        task.priority,
        task.identifier,
        event.doer().display_name(),
    );

    truncate_content(message)
}

/// Clamp message content to [`MAX_CONTENT_LENGTH`] characters.
pub fn truncate_content(content: String) -> String {
    if content.chars().count() <= MAX_CONTENT_LENGTH {
        return content;
    }

    let keep = MAX_CONTENT_LENGTH - TRUNCATION_MARKER.len();
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
