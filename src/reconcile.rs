// File: src/reconcile.rs
//! Cross-references today's recurring rules with today's daily note.
//!
//! Each applicable rule ends up in exactly one bucket:
//! - checked `🔄` line present: dropped,
//! - unchecked `🔄` line present: `materialized` (shown as an open task),
//! - no line: `pending` (offered for generation).
use crate::config::Config;
use crate::model::matcher::{self, CheckState};
use crate::model::recurrence::parse_rule_table;
use crate::model::{PendingRecurringTask, RecurringRule, Task};
use crate::paths::DateNamingScheme;
use crate::vault::VaultStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub materialized: Vec<Task>,
    pub pending: Vec<PendingRecurringTask>,
}

/// State of one rule inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStatus {
    Absent,
    Open,
    Completed,
}

pub fn rule_status(note: &str, name: &str) -> RuleStatus {
    if matcher::note_contains_task(note, name, CheckState::Checked) {
        RuleStatus::Completed
    } else if matcher::note_contains_task(note, name, CheckState::Unchecked) {
        RuleStatus::Open
    } else {
        RuleStatus::Absent
    }
}

pub struct RecurringReconciler<'a> {
    vault: &'a dyn VaultStore,
    daily_root: &'a str,
    rules_path: &'a str,
}

impl<'a> RecurringReconciler<'a> {
    pub fn new(vault: &'a dyn VaultStore, config: &'a Config) -> Self {
        Self {
            vault,
            daily_root: &config.daily_note_path,
            rules_path: config.recurring_config_path.trim(),
        }
    }

    /// Parses the rule table. An unset path or a missing file yields no rules.
    pub async fn load_rules(&self) -> Result<Vec<RecurringRule>> {
        if self.rules_path.is_empty() {
            return Ok(vec![]);
        }
        if !self.vault.exists(self.rules_path).await {
            log::warn!("Recurring config file not found: {}", self.rules_path);
            return Ok(vec![]);
        }
        let content = self
            .vault
            .read(self.rules_path)
            .await
            .with_context(|| format!("Failed to read recurring config {}", self.rules_path))?;
        Ok(parse_rule_table(&content))
    }

    pub async fn reconcile(&self, date: NaiveDate) -> Result<Reconciliation> {
        let rules = self.load_rules().await?;
        if rules.is_empty() {
            return Ok(Reconciliation::default());
        }

        let due_today: Vec<RecurringRule> =
            rules.into_iter().filter(|r| r.applies_on(date)).collect();
        if due_today.is_empty() {
            return Ok(Reconciliation::default());
        }

        let note_path = DateNamingScheme::path_for(date, self.daily_root);
        let note = if self.vault.exists(&note_path).await {
            self.vault.read(&note_path).await?
        } else {
            String::new()
        };

        let mut result = Reconciliation::default();
        for rule in due_today {
            match rule_status(&note, &rule.name) {
                RuleStatus::Completed => {
                    log::debug!("Recurring task '{}' already done today", rule.name);
                }
                RuleStatus::Open => {
                    result
                        .materialized
                        .push(Task::from_recurring(&rule.name, &note_path, date));
                }
                RuleStatus::Absent => result.pending.push(PendingRecurringTask {
                    name: rule.name,
                    periodicity: rule.periodicity,
                    trigger: rule.trigger,
                }),
            }
        }

        Ok(result)
    }
}
