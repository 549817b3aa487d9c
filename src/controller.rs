// File: src/controller.rs
//! Entry point for every front-end action.
//!
//! Front-ends never talk to the writer or the mover directly: going through the
//! controller guarantees the aggregator cache is invalidated after each mutation and
//! the reminder marker is persisted in one place.
use crate::aggregator::TaskAggregator;
use crate::clock::Clock;
use crate::config::Config;
use crate::context::SharedContext;
use crate::index::TaskIndex;
use crate::model::{PendingRecurringTask, Task, TaskDataResult, TaskMoveResult};
use crate::mover::{MoveError, TaskMover};
use crate::reminder::{self, notice_text};
use crate::vault::VaultStore;
use crate::writer::{DailyNoteWriter, NoteHandle};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What one reminder display found and which surfaces it wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOutcome {
    pub result: TaskDataResult,
    pub pending: Vec<PendingRecurringTask>,
    pub notice: String,
    pub show_notice: bool,
    pub show_modal: bool,
    /// How long a front-end keeps the notice on screen.
    pub notice_duration: Duration,
    /// Today was recorded as "shown".
    pub marked_shown: bool,
}

impl ReminderOutcome {
    pub fn found_anything(&self) -> bool {
        !self.result.tasks.is_empty() || !self.pending.is_empty()
    }
}

#[derive(Clone)]
pub struct ReminderController {
    pub aggregator: Arc<TaskAggregator>,
    vault: Arc<dyn VaultStore>,
    clock: Arc<dyn Clock>,
    /// Where settings are persisted. `None` keeps them in memory only.
    ctx: Option<SharedContext>,
}

impl ReminderController {
    pub fn new(
        config: Config,
        vault: Arc<dyn VaultStore>,
        index: Option<Arc<dyn TaskIndex>>,
        clock: Arc<dyn Clock>,
        ctx: Option<SharedContext>,
    ) -> Self {
        let aggregator = Arc::new(TaskAggregator::new(config, vault.clone(), index, clock.clone()));
        Self {
            aggregator,
            vault,
            clock,
            ctx,
        }
    }

    pub async fn config(&self) -> Arc<Config> {
        self.aggregator.config().await
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn writer(&self) -> DailyNoteWriter {
        DailyNoteWriter::new(self.vault.clone(), self.config().await, self.clock.clone())
    }

    pub async fn mover(&self) -> TaskMover {
        TaskMover::new(self.vault.clone(), self.config().await, self.clock.clone())
    }

    pub async fn get_task_data(&self) -> TaskDataResult {
        self.aggregator.get_task_data().await
    }

    pub async fn get_pending_recurring_tasks(&self) -> Vec<PendingRecurringTask> {
        self.aggregator.get_pending_recurring_tasks().await
    }

    /// Adds `- [ ] {text}` to the note for `date` (today if `None`).
    pub async fn add_task(&self, text: &str, date: Option<NaiveDate>) -> Result<NoteHandle> {
        let text = text.trim();
        if text.is_empty() {
            bail!("Task text is empty");
        }
        let date = date.unwrap_or_else(|| self.today());
        let note = self.writer().await.write_task(text, date).await?;
        self.aggregator.invalidate_cache();
        log::info!("Added task to {}", note.path);
        Ok(note)
    }

    pub async fn move_task(&self, task: &Task, target: NaiveDate) -> Result<TaskMoveResult, MoveError> {
        let result = self.mover().await.move_task(task, target).await;
        if result.is_ok() {
            self.aggregator.invalidate_cache();
        }
        result
    }

    /// Moves whatever task sits at `path:line` (0-based).
    pub async fn move_line(&self, path: &str, line: usize, target: NaiveDate) -> Result<TaskMoveResult, MoveError> {
        if !self.vault.exists(path).await {
            return Err(MoveError::SourceMissing(path.to_string()));
        }
        let content = self
            .vault
            .read(path)
            .await
            .map_err(|e| MoveError::Read(path.to_string(), e))?;
        let lines: Vec<&str> = content.split('\n').collect();
        let text = lines.get(line).ok_or(MoveError::LineOutOfRange {
            path: path.to_string(),
            line,
            len: lines.len(),
        })?;

        let mover = self.mover().await;
        let task = mover.task_from_line(path, line, text)?;
        let result = mover.move_task(&task, target).await;
        if result.is_ok() {
            self.aggregator.invalidate_cache();
        }
        result
    }

    /// Writes `tasks` into today's note. Returns how many lines were added.
    pub async fn generate_recurring(&self, tasks: &[PendingRecurringTask]) -> Result<usize> {
        let count = self.writer().await.write_recurring_tasks(tasks).await?;
        self.aggregator.invalidate_cache();
        Ok(count)
    }

    /// Generates every recurring task pending today.
    pub async fn generate_pending(&self) -> Result<usize> {
        let pending = self.get_pending_recurring_tasks().await;
        self.generate_recurring(&pending).await
    }

    /// Delay before the automatic reminder, or `None` if it should not run today.
    pub async fn schedule_delay(&self) -> Option<Duration> {
        let config = self.config().await;
        if !config.enabled {
            log::debug!("Auto reminder disabled");
            return None;
        }
        if !reminder::should_schedule(&config, self.today()) {
            log::debug!("Reminder already shown today, skipping");
            return None;
        }
        Some(config.popup_delay())
    }

    /// Collects today's tasks and decides how to present them.
    ///
    /// A non-forced display that finds anything records today as shown.
    pub async fn show_reminder(&self, force: bool) -> Result<ReminderOutcome> {
        let result = self.get_task_data().await;
        let pending = self.get_pending_recurring_tasks().await;
        for err in result.errors.iter().filter(|e| !e.recoverable) {
            log::error!("{}: {}", err.source, err.message);
        }
        log::debug!(
            "Found {} tasks, {} pending recurring",
            result.tasks.len(),
            pending.len()
        );

        let config = self.config().await;
        let mut outcome = ReminderOutcome {
            notice: notice_text(result.tasks.len(), pending.len()),
            notice_duration: config.notice_duration(),
            result,
            pending,
            ..ReminderOutcome::default()
        };

        if outcome.found_anything() {
            outcome.show_notice = config.reminder_style.shows_notice();
            outcome.show_modal = config.reminder_style.shows_modal();
        } else {
            log::debug!("No tasks found, not recording as shown");
            outcome.show_notice = force;
        }

        if let Some(marker) = reminder::next_marker(force, outcome.found_anything(), self.today()) {
            let mut updated = (*config).clone();
            updated.last_reminder_date = marker;
            // The reminder is still shown; only the next start may repeat it.
            if let Err(e) = self.persist(&updated) {
                log::warn!("Could not persist the reminder marker: {:#}", e);
            }
            self.aggregator.update_settings(updated).await;
            outcome.marked_shown = true;
        }

        Ok(outcome)
    }

    /// Replaces the settings everywhere and persists them.
    pub async fn update_settings(&self, config: Config) -> Result<()> {
        self.persist(&config)?;
        self.aggregator.update_settings(config).await;
        Ok(())
    }

    fn persist(&self, config: &Config) -> Result<()> {
        if let Some(ctx) = &self.ctx {
            config
                .save(ctx.as_ref())
                .context("Failed to save settings")?;
        }
        Ok(())
    }
}
