// File: src/sources/project.rs
use super::{SourceEnv, TaskSource, resolve_field_date};
use crate::index::{IndexedPage, TaskIndex};
use crate::model::{SourceKind, Task};
use crate::paths::DateNamingScheme;
use anyhow::Result;
use async_trait::async_trait;

const DONE_FIELD: &str = "Done";
const DUE_FIELD: &str = "Due Date";

/// Event pages of a project calendar that are not done and due today or earlier.
///
/// An event page lives in a folder with a path segment named `events` and carries
/// a `Done` frontmatter key; pages without the key are not events.
pub struct ProjectCalendarSource;

fn is_open_event(page: &IndexedPage) -> bool {
    let in_events_folder = page
        .folder
        .split('/')
        .any(|part| part.eq_ignore_ascii_case("events"));
    let open = page
        .field(DONE_FIELD)
        .is_some_and(|done| done.as_bool() != Some(true));
    in_events_folder && open
}

#[async_trait]
impl TaskSource for ProjectCalendarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ProjectCalendar
    }

    async fn get_tasks(&self, index: &dyn TaskIndex, env: &SourceEnv<'_>) -> Result<Vec<Task>> {
        if !DateNamingScheme::is_configured(&env.config.project_calendar_path) {
            return Ok(vec![]);
        }
        let root = DateNamingScheme::normalize_root(&env.config.project_calendar_path);
        if !env.vault.exists(root).await {
            log::warn!("Project calendar path not found: {}", root);
            return Ok(vec![]);
        }

        let pages = index.pages(Some(root), &is_open_event).await?;
        let tasks: Vec<Task> = pages
            .iter()
            .filter_map(|page| {
                let due = page.field(DUE_FIELD).and_then(resolve_field_date)?;
                (due <= env.today)
                    .then(|| Task::from_page(SourceKind::ProjectCalendar, &page.path, &page.name, due))
            })
            .collect();

        log::debug!("Project source: {} open events", tasks.len());
        Ok(tasks)
    }
}
