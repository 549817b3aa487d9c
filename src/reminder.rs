// File: src/reminder.rs
//! When to show the daily reminder, and what it says.
use crate::config::Config;
use crate::model::item::format_iso;
use crate::model::{PendingRecurringTask, SourceKind, Task, TaskDataResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use strum::IntoEnumIterator;

/// Whether the automatic reminder already ran today.
///
/// Derived from `Config::last_reminder_date` by plain string comparison with today's
/// ISO date, so a clock moved backwards can make an old marker look current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderState {
    NotYetShownToday,
    ShownToday,
}

impl ReminderState {
    pub fn from_marker(last_shown: &str, today: NaiveDate) -> Self {
        if last_shown == format_iso(today) {
            ReminderState::ShownToday
        } else {
            ReminderState::NotYetShownToday
        }
    }
}

/// True if the automatic reminder should be scheduled today.
pub fn should_schedule(config: &Config, today: NaiveDate) -> bool {
    config.enabled
        && ReminderState::from_marker(&config.last_reminder_date, today)
            == ReminderState::NotYetShownToday
}

/// The new marker value after a display, if it changes.
///
/// Only a non-forced display that found something records the day.
pub fn next_marker(force: bool, found_anything: bool, today: NaiveDate) -> Option<String> {
    (!force && found_anything).then(|| format_iso(today))
}

pub fn notice_text(task_count: usize, pending_count: usize) -> String {
    let mut parts = Vec::new();
    if task_count > 0 {
        parts.push(format!("{} open task{}", task_count, plural(task_count)));
    }
    if pending_count > 0 {
        parts.push(format!("{} recurring to generate", pending_count));
    }
    if parts.is_empty() {
        "✅ No open tasks today!".to_string()
    } else {
        format!("⏰ Today: {}!", parts.join(", "))
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Status-bar text: `📋 N`, or `📋 ?` when the index is unavailable.
pub fn status_label(result: &TaskDataResult) -> String {
    if result.has_fatal_error() {
        "📋 ?".to_string()
    } else {
        format!("📋 {}", result.tasks.len())
    }
}

pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due_date
        .as_deref()
        .is_some_and(|due| due < format_iso(today).as_str())
}

/// Plain-text rendering of the reminder: tasks grouped by source, then pending
/// recurring rules.
pub fn render_reminder(result: &TaskDataResult, pending: &[PendingRecurringTask], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Today's tasks ({})", result.tasks.len());

    for kind in SourceKind::iter() {
        let group: Vec<&Task> = result.tasks.iter().filter(|t| t.source == kind).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{} ({})", kind.label(), group.len());
        for task in group {
            let icon = if task.is_meeting { "🗓️" } else { "•" };
            let overdue = if is_overdue(task, today) { "  ⚠️ overdue" } else { "" };
            let _ = writeln!(out, "  {} {}{}", icon, task.text, overdue);
        }
    }

    if !pending.is_empty() {
        let _ = writeln!(out, "\n🔄 To generate ({})", pending.len());
        for p in pending {
            let _ = writeln!(out, "  • {} ({} {})", p.name, p.periodicity, p.trigger);
        }
    }

    for err in &result.errors {
        let _ = writeln!(out, "\n⚠️ {}: {}", err.source, err.message);
    }

    out
}
