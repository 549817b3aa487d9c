// File: src/writer.rs
//! Creates daily notes and appends task lines to them.
use crate::clock::Clock;
use crate::config::Config;
use crate::model::PendingRecurringTask;
use crate::model::matcher::{self, CheckState};
use crate::paths::DateNamingScheme;
use crate::template::{default_template, render_template};
use crate::vault::{VaultStore, parent_folder};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const UNCONFIGURED_MESSAGE: &str = "Daily note path is not configured";

/// The daily note `ensure_note` resolved or created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteHandle {
    pub path: String,
    pub created: bool,
    /// Set when the configured template could not be used.
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct DailyNoteWriter {
    vault: Arc<dyn VaultStore>,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
}

impl DailyNoteWriter {
    pub fn new(vault: Arc<dyn VaultStore>, config: Arc<Config>, clock: Arc<dyn Clock>) -> Self {
        Self {
            vault,
            config,
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_daily_configured()
    }

    pub fn get_path_for_date(&self, date: NaiveDate) -> String {
        DateNamingScheme::path_for(date, &self.config.daily_note_path)
    }

    fn require_configured(&self) -> Result<()> {
        if !self.is_configured() {
            bail!(UNCONFIGURED_MESSAGE);
        }
        Ok(())
    }

    /// Returns the note for `date`, creating it (and its folders) if needed.
    pub async fn ensure_note(&self, date: NaiveDate) -> Result<NoteHandle> {
        self.require_configured()?;
        let path = self.get_path_for_date(date);
        if self.vault.exists(&path).await {
            return Ok(NoteHandle {
                path,
                created: false,
                warning: None,
            });
        }

        self.ensure_folder(parent_folder(&path)).await?;
        let (content, warning) = self.initial_content(date).await;
        if let Some(w) = &warning {
            log::warn!("{}", w);
        }
        self.vault
            .create(&path, &content)
            .await
            .with_context(|| format!("Failed to create daily note {}", path))?;
        log::info!("Created daily note {}", path);

        Ok(NoteHandle {
            path,
            created: true,
            warning,
        })
    }

    async fn ensure_folder(&self, folder: &str) -> Result<()> {
        let mut current = String::new();
        for part in folder.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            if !self.vault.exists(&current).await {
                self.vault
                    .create_folder(&current)
                    .await
                    .with_context(|| format!("Failed to create folder {}", current))?;
            }
        }
        Ok(())
    }

    async fn initial_content(&self, date: NaiveDate) -> (String, Option<String>) {
        let template_path = self.config.daily_note_template_path.trim();
        if template_path.is_empty() {
            return (default_template(date), None);
        }
        if !self.vault.exists(template_path).await {
            return (
                default_template(date),
                Some(format!(
                    "Template file not found, using default template: {}",
                    template_path
                )),
            );
        }
        match self.vault.read(template_path).await {
            Ok(template) => (render_template(&template, date, self.clock.now()), None),
            Err(e) => (
                default_template(date),
                Some(format!(
                    "Failed to read template {}, using default template: {:#}",
                    template_path, e
                )),
            ),
        }
    }

    /// Appends `- [ ] {content}` to the note for `date`.
    pub async fn write_task(&self, content: &str, date: NaiveDate) -> Result<NoteHandle> {
        self.require_configured()?;
        self.write_task_line(&format!("- [ ] {}", content), date).await
    }

    /// Appends `line` verbatim to the note for `date`. The handle carries any
    /// template warning from creating the note.
    pub async fn write_task_line(&self, line: &str, date: NaiveDate) -> Result<NoteHandle> {
        let note = self.ensure_note(date).await?;
        let mut content = self
            .vault
            .read(&note.path)
            .await
            .with_context(|| format!("Failed to read {}", note.path))?;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(line);
        content.push('\n');
        self.vault
            .write(&note.path, &content)
            .await
            .with_context(|| format!("Failed to write {}", note.path))?;
        Ok(note)
    }

    /// Materializes `tasks` into today's note. See `write_recurring_tasks_for`.
    pub async fn write_recurring_tasks(&self, tasks: &[PendingRecurringTask]) -> Result<usize> {
        self.write_recurring_tasks_for(self.clock.today(), tasks).await
    }

    /// Appends one `- [ ] 🔄 {name}` line per task not already in the note, as a single
    /// block. Duplicate names in `tasks` are written once. Returns how many were written.
    pub async fn write_recurring_tasks_for(
        &self,
        date: NaiveDate,
        tasks: &[PendingRecurringTask],
    ) -> Result<usize> {
        if tasks.is_empty() {
            return Ok(0);
        }
        self.require_configured()?;

        let note = self.ensure_note(date).await?;
        let mut content = self
            .vault
            .read(&note.path)
            .await
            .with_context(|| format!("Failed to read {}", note.path))?;

        let mut seen = HashSet::new();
        let to_write: Vec<&str> = tasks
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| seen.insert(*name))
            .filter(|name| !matcher::note_contains_task(&content, name, CheckState::Any))
            .collect();
        if to_write.is_empty() {
            log::debug!("All recurring tasks already present in {}", note.path);
            return Ok(0);
        }

        let block = to_write
            .iter()
            .map(|name| format!("- [ ] {} {}", matcher::RECURRING_GLYPH, name))
            .collect::<Vec<_>>()
            .join("\n");
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
        content.push_str(&block);
        content.push('\n');

        self.vault
            .write(&note.path, &content)
            .await
            .with_context(|| format!("Failed to write {}", note.path))?;
        log::info!("Wrote {} recurring tasks to {}", to_write.len(), note.path);
        Ok(to_write.len())
    }
}
