// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};

use heyama_core::{HeyamaObject, PushEvent};

/// Maximum line width for wrapped text content (excluding 4-space indent).
const WRAP_WIDTH: usize = 76;

/// Longest description shown on a list line.
const LIST_DESCRIPTION_LEN: usize = 60;

/// Wrap text at word boundaries if it's a single line.
///
/// - If content contains newlines: return as-is (preserve user formatting)
/// - If content is single line >width: wrap at word boundaries
/// - If content is single line <=width: return as-is
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.chars().count() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Cut text to `len` characters, appending `...` when shortened.
pub fn truncate_text(text: &str, len: usize) -> String {
    if text.chars().count() <= len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(len).collect();
    out.push_str("...");
    out
}

/// Human-friendly distance from `then` to `now`, e.g. "3 hours ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }
    if seconds < 45 {
        return "just now".to_string();
    }

    let minutes = (seconds + 30) / 60;
    let (value, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if minutes < 60 * 24 {
        ((minutes + 30) / 60, "hour")
    } else if minutes < 60 * 24 * 30 {
        (minutes / (60 * 24), "day")
    } else if minutes < 60 * 24 * 365 {
        (minutes / (60 * 24 * 30), "month")
    } else {
        (minutes / (60 * 24 * 365), "year")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Full timestamp, e.g. "05 March 2026 14:30".
pub fn full_date(at: DateTime<Utc>) -> String {
    at.format("%d %B %Y %H:%M").to_string()
}

/// Format a single object line for list output
pub fn format_object_line(object: &HeyamaObject, now: DateTime<Utc>) -> String {
    format!(
        "- {}: {} ({}){}",
        object.id,
        object.title,
        relative_time(object.created_at, now),
        if object.has_image() { " [image]" } else { "" }
    )
}

/// Format a line for list output with the description preview underneath.
pub fn format_object_summary(object: &HeyamaObject, now: DateTime<Utc>) -> String {
    let mut out = format_object_line(object, now);
    if !object.description.is_empty() {
        out.push_str("\n    ");
        out.push_str(&truncate_text(&object.description, LIST_DESCRIPTION_LEN));
    }
    out
}

/// Format object details for show command
pub fn format_object_details(object: &HeyamaObject) -> String {
    let mut output = Vec::new();

    output.push(object.id.clone());
    output.push(format!("Title: {}", object.title));
    output.push(format!("Created: {}", full_date(object.created_at)));
    if object.is_edited() {
        output.push(format!("Updated: {}", full_date(object.updated_at)));
    }
    if object.has_image() {
        output.push(format!("Image: {}", object.image_url));
    }

    output.push(String::new());
    output.push("Description:".to_string());
    for line in wrap_text(&object.description, WRAP_WIDTH).lines() {
        output.push(format!("    {}", line));
    }

    output.join("\n")
}

/// Format a push event for the watch command.
pub fn format_push_event(event: &PushEvent) -> String {
    match event {
        PushEvent::Created(object) => format!("+ {}: {}", object.id, object.title),
        PushEvent::Updated(object) => format!("~ {}: {}", object.id, object.title),
        PushEvent::Deleted(id) => format!("- {}", id),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
