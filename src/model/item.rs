// File: ./src/model/item.rs
use crate::model::matcher;
use crate::model::recurrence::Periodicity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Maximum number of characters kept in `Task::text`.
pub const MAX_TEXT_CHARS: usize = 60;

/// Where a task was found. The declaration order is the aggregation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[strum(to_string = "daily")]
    Daily,
    #[strum(to_string = "project")]
    ProjectCalendar,
    #[strum(to_string = "holiday")]
    Holiday,
    #[strum(to_string = "recurring")]
    Recurring,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Daily => "📅 Daily",
            SourceKind::ProjectCalendar => "📁 Project",
            SourceKind::Holiday => "🎉 Holiday",
            SourceKind::Recurring => "🔄 Recurring",
        }
    }
}

/// A normalized todo item. Built fresh on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub source: SourceKind,
    pub source_label: String,
    /// Marker- and tag-stripped, truncated copy of `full_text`.
    pub text: String,
    pub full_text: String,
    pub is_meeting: bool,
    pub file_path: String,
    /// 0-based line in `file_path`. `None` for synthetic items.
    pub line: Option<usize>,
    /// ISO date (`YYYY-MM-DD`).
    pub due_date: Option<String>,
}

impl Task {
    /// A checklist item read out of a daily note.
    pub fn from_checklist_item(
        file_path: &str,
        line: usize,
        full_text: &str,
        tags: &[String],
        due: NaiveDate,
    ) -> Self {
        Self {
            id: format!("{}:{}", file_path, line),
            source: SourceKind::Daily,
            source_label: SourceKind::Daily.label().to_string(),
            text: matcher::clean_task_text(full_text, MAX_TEXT_CHARS),
            full_text: full_text.to_string(),
            is_meeting: is_meeting_tags(tags),
            file_path: file_path.to_string(),
            line: Some(line),
            due_date: Some(format_iso(due)),
        }
    }

    /// A page-level item (one file == one task), e.g. project events and holidays.
    pub fn from_page(source: SourceKind, file_path: &str, title: &str, due: NaiveDate) -> Self {
        Self {
            id: format!("{}:0", file_path),
            source,
            source_label: source.label().to_string(),
            text: title.to_string(),
            full_text: title.to_string(),
            is_meeting: false,
            file_path: file_path.to_string(),
            line: Some(0),
            due_date: Some(format_iso(due)),
        }
    }

    /// A recurring rule already materialized (and still open) in a daily note.
    pub fn from_recurring(name: &str, note_path: &str, date: NaiveDate) -> Self {
        Self {
            id: format!("recurring:{}", name),
            source: SourceKind::Recurring,
            source_label: SourceKind::Recurring.label().to_string(),
            text: name.to_string(),
            full_text: format!("{} {}", matcher::RECURRING_GLYPH, name),
            is_meeting: false,
            file_path: note_path.to_string(),
            line: None,
            due_date: Some(format_iso(date)),
        }
    }
}

pub fn is_meeting_tags(tags: &[String]) -> bool {
    tags.iter().any(|t| t.to_lowercase().contains("meeting"))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A recurring rule due today that has not been written to today's note yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecurringTask {
    pub name: String,
    pub periodicity: Periodicity,
    pub trigger: String,
}

/// Per-source failure collected during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: String,
    pub message: String,
    pub recoverable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub daily: usize,
    pub project_calendar: usize,
    pub holiday: usize,
    pub recurring: usize,
}

impl SourceCounts {
    pub fn get(&self, source: SourceKind) -> usize {
        match source {
            SourceKind::Daily => self.daily,
            SourceKind::ProjectCalendar => self.project_calendar,
            SourceKind::Holiday => self.holiday,
            SourceKind::Recurring => self.recurring,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDataResult {
    pub tasks: Vec<Task>,
    pub counts: SourceCounts,
    pub errors: Vec<SourceError>,
}

impl TaskDataResult {
    /// Builds the result, deriving the counts from the merged list.
    pub fn new(tasks: Vec<Task>, errors: Vec<SourceError>) -> Self {
        let count = |s: SourceKind| tasks.iter().filter(|t| t.source == s).count();
        let counts = SourceCounts {
            daily: count(SourceKind::Daily),
            project_calendar: count(SourceKind::ProjectCalendar),
            holiday: count(SourceKind::Holiday),
            recurring: count(SourceKind::Recurring),
        };
        Self {
            tasks,
            counts,
            errors,
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self::new(
            vec![],
            vec![SourceError {
                source: "index".to_string(),
                message: message.to_string(),
                recoverable: false,
            }],
        )
    }

    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(|e| !e.recoverable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMoveResult {
    pub success: bool,
    pub from_path: String,
    pub to_path: String,
    pub task_text: String,
    /// Set together with `success == true` when the source line could not be removed.
    pub error: Option<String>,
}
