// File: src/mover.rs
//! Moves one task line between daily notes.
//!
//! The line is written to the target note first and only then removed from the
//! source. If the removal fails the task exists twice, never zero times.
use crate::clock::Clock;
use crate::config::Config;
use crate::model::item::format_iso;
use crate::model::matcher;
use crate::model::{SourceKind, Task, TaskMoveResult};
use crate::paths::DateNamingScheme;
use crate::vault::{VaultStore, normalize_folder};
use crate::writer::DailyNoteWriter;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

pub const PARTIAL_MOVE_MESSAGE: &str =
    "Task was copied to the target date but could not be removed from the source note; remove the duplicate manually";

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Only tasks from daily notes can be moved")]
    NotDailyTask,
    #[error("Task has no line number")]
    MissingLine,
    #[error("Moving tasks to a past date is not allowed")]
    PastDate,
    #[error("Daily note path is not configured")]
    Unconfigured,
    #[error("Task is already in the note for {0}")]
    SameNote(String),
    #[error("Source note not found: {0}")]
    SourceMissing(String),
    #[error("Failed to read {0}: {1:#}")]
    Read(String, anyhow::Error),
    #[error("Line {line} is past the end of {path} ({len} lines); reopen the reminder and try again")]
    LineOutOfRange { path: String, line: usize, len: usize },
    #[error("Line {line} of {path} changed since the task list was loaded; reopen the reminder and try again")]
    StaleLine { path: String, line: usize },
    #[error("Line {0} is not an unchecked task")]
    NotATask(usize),
    #[error("{0} is not inside the daily note folder")]
    OutsideDailyRoot(String),
    #[error("{0:#}")]
    Write(anyhow::Error),
}

pub struct TaskMover {
    writer: DailyNoteWriter,
    vault: Arc<dyn VaultStore>,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
}

impl TaskMover {
    pub fn new(vault: Arc<dyn VaultStore>, config: Arc<Config>, clock: Arc<dyn Clock>) -> Self {
        Self {
            writer: DailyNoteWriter::new(vault.clone(), config.clone(), clock.clone()),
            vault,
            config,
            clock,
        }
    }

    /// Whether `task` can be offered for moving at all. Returns its line on success.
    pub fn can_move(task: &Task) -> Result<usize, MoveError> {
        if task.source != SourceKind::Daily {
            return Err(MoveError::NotDailyTask);
        }
        task.line.ok_or(MoveError::MissingLine)
    }

    /// Builds a movable task from a line of an open note.
    pub fn task_from_line(&self, path: &str, line: usize, text: &str) -> Result<Task, MoveError> {
        if !self.config.is_daily_configured() {
            return Err(MoveError::Unconfigured);
        }
        if !DateNamingScheme::is_under_root(path, &self.config.daily_note_path) {
            return Err(MoveError::OutsideDailyRoot(path.to_string()));
        }
        if !matcher::is_unchecked_task_line(text) {
            return Err(MoveError::NotATask(line));
        }
        let (_, body) = matcher::parse_checklist_line(text).ok_or(MoveError::NotATask(line))?;

        let date = DateNamingScheme::date_from_note_path(path);
        let mut task =
            Task::from_checklist_item(path, line, body, &[], date.unwrap_or_else(|| self.clock.today()));
        task.due_date = date.map(format_iso);
        Ok(task)
    }

    pub async fn move_task(&self, task: &Task, target: NaiveDate) -> Result<TaskMoveResult, MoveError> {
        let line = Self::can_move(task)?;
        if !self.config.allow_move_to_past && target < self.clock.today() {
            return Err(MoveError::PastDate);
        }
        if !self.writer.is_configured() {
            return Err(MoveError::Unconfigured);
        }

        let from_path = task.file_path.clone();
        let to_path = self.writer.get_path_for_date(target);
        if normalize_folder(&from_path) == normalize_folder(&to_path) {
            return Err(MoveError::SameNote(format_iso(target)));
        }

        if !self.vault.exists(&from_path).await {
            return Err(MoveError::SourceMissing(from_path));
        }
        let content = self
            .vault
            .read(&from_path)
            .await
            .map_err(|e| MoveError::Read(from_path.clone(), e))?;
        let mut lines: Vec<&str> = content.split('\n').collect();
        let Some(raw) = lines.get(line).copied() else {
            return Err(MoveError::LineOutOfRange {
                path: from_path,
                line,
                len: lines.len(),
            });
        };
        if !still_holds(raw, task) {
            return Err(MoveError::StaleLine {
                path: from_path,
                line,
            });
        }

        // Write phase: a failure here leaves the source untouched.
        self.writer
            .write_task_line(raw.trim_end_matches('\r'), target)
            .await
            .map_err(MoveError::Write)?;

        // Delete phase.
        lines.remove(line);
        if let Err(e) = self.vault.write(&from_path, &lines.join("\n")).await {
            log::warn!(
                "Moved task to {} but failed to remove it from {}: {:#}",
                to_path,
                from_path,
                e
            );
            return Ok(TaskMoveResult {
                success: true,
                from_path,
                to_path,
                task_text: task.full_text.clone(),
                error: Some(PARTIAL_MOVE_MESSAGE.to_string()),
            });
        }

        log::info!("Moved task from {} to {}", from_path, to_path);
        Ok(TaskMoveResult {
            success: true,
            from_path,
            to_path,
            task_text: task.full_text.clone(),
            error: None,
        })
    }
}

/// The line at the task's position is still the same open checklist item.
fn still_holds(raw: &str, task: &Task) -> bool {
    matcher::parse_checklist_line(raw)
        .is_some_and(|(marker, body)| marker == ' ' && body.trim_end() == task.full_text.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::vault::MemoryVault;

    fn mover() -> TaskMover {
        let config = Config {
            daily_note_path: "Daily".to_string(),
            ..Config::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        TaskMover::new(
            Arc::new(MemoryVault::new()),
            Arc::new(config),
            Arc::new(FixedClock::on(today)),
        )
    }

    #[test]
    fn test_can_move_requires_daily_source_and_line() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let holiday = Task::from_page(SourceKind::Holiday, "Holidays/x.md", "x", today);
        assert!(matches!(TaskMover::can_move(&holiday), Err(MoveError::NotDailyTask)));

        let mut daily = Task::from_checklist_item("Daily/a.md", 3, "pay rent", &[], today);
        assert_eq!(TaskMover::can_move(&daily).unwrap(), 3);
        daily.line = None;
        assert!(matches!(TaskMover::can_move(&daily), Err(MoveError::MissingLine)));
    }

    #[test]
    fn test_task_from_line() {
        let m = mover();
        let path = "Daily/2026/10.October/2026-10-14.md";

        let task = m.task_from_line(path, 4, "  - [ ] call mom #family").unwrap();
        assert_eq!(task.line, Some(4));
        assert_eq!(task.full_text, "call mom #family");
        assert_eq!(task.text, "call mom");
        assert_eq!(task.due_date.as_deref(), Some("2026-10-14"));

        assert!(matches!(
            m.task_from_line(path, 1, "- [x] done"),
            Err(MoveError::NotATask(1))
        ));
        assert!(matches!(
            m.task_from_line("Projects/a.md", 0, "- [ ] x"),
            Err(MoveError::OutsideDailyRoot(_))
        ));
    }
}
