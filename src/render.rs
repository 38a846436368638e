//! Colored terminal summaries of finished passes.

use calsheet_core::reconcile::{PullReport, PushReport};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

fn pluralize(count: usize) -> &'static str {
    if count == 1 { "event" } else { "events" }
}

fn counts(lines: &mut Vec<String>, created: usize, updated: usize, deleted: usize) {
    if created > 0 {
        let label = format!("{} new {}", created, pluralize(created));
        lines.push(format!("   {} {}", "+".green(), label.green()));
    }
    if updated > 0 {
        let label = format!("{} changed {}", updated, pluralize(updated));
        lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
    }
    if deleted > 0 {
        let label = format!("{} deleted {}", deleted, pluralize(deleted));
        lines.push(format!("   {} {}", "-".red(), label.red()));
    }
}

impl Render for PullReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();
        if self.header_initialized {
            lines.push("   Initialized table header".dimmed().to_string());
        }
        if self.created + self.updated + self.deleted == 0 {
            lines.push("   Table already up to date".dimmed().to_string());
        }
        counts(&mut lines, self.created, self.updated, self.deleted);
        lines.join("\n")
    }
}

impl Render for PushReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();
        if !self.has_changes() && self.declined == 0 {
            lines.push("   Calendar already up to date".dimmed().to_string());
        }
        counts(&mut lines, self.added, self.updated, self.deleted);
        if self.declined > 0 {
            let label = format!(
                "kept {} {} missing from the table",
                self.declined,
                pluralize(self.declined)
            );
            lines.push(format!("   {} {}", "=".dimmed(), label.dimmed()));
        }
        if !self.skipped.is_empty() {
            let rows = if self.skipped.len() == 1 { "row" } else { "rows" };
            let label = format!("{} invalid {} skipped", self.skipped.len(), rows);
            lines.push(format!("   {} {}", "!".yellow(), label.yellow()));
        }
        lines.join("\n")
    }
}
