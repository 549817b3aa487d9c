// File: src/sources/daily.rs
use super::{SourceEnv, TaskSource};
use crate::index::TaskIndex;
use crate::model::{SourceKind, Task};
use crate::paths::DateNamingScheme;
use anyhow::Result;
use async_trait::async_trait;

/// Open checklist items of daily notes dated today or earlier.
///
/// Overdue items are carried forward; notes for future days are ignored, as are
/// files whose name is not a strict `YYYY-MM-DD`.
pub struct DailySource;

#[async_trait]
impl TaskSource for DailySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Daily
    }

    async fn get_tasks(&self, index: &dyn TaskIndex, env: &SourceEnv<'_>) -> Result<Vec<Task>> {
        if !env.config.is_daily_configured() {
            return Ok(vec![]);
        }
        let root = DateNamingScheme::normalize_root(&env.config.daily_note_path);
        if !env.vault.exists(root).await {
            log::warn!("Daily note path not found: {}", root);
            return Ok(vec![]);
        }

        let mut tasks = Vec::new();
        for item in index.open_tasks(root).await? {
            if item.completed {
                continue;
            }
            let Some(date) = DateNamingScheme::date_from_note_path(&item.path) else {
                continue;
            };
            if date <= env.today {
                tasks.push(Task::from_checklist_item(
                    &item.path, item.line, &item.text, &item.tags, date,
                ));
            }
        }

        log::debug!("Daily source: {} open tasks", tasks.len());
        Ok(tasks)
    }
}
