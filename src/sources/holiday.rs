// File: src/sources/holiday.rs
use super::{SourceEnv, TaskSource, resolve_field_date};
use crate::index::{IndexedPage, TaskIndex};
use crate::model::{SourceKind, Task};
use crate::paths::parse_strict_date;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Holiday pages anywhere in the vault whose date is exactly today.
///
/// Unlike the other sources there is no carry-over: a holiday is a single day.
pub struct HolidaySource;

fn is_holiday(page: &IndexedPage) -> bool {
    page.has_tag("#holiday")
        || page
            .field("type")
            .is_some_and(|v| v.equals_or_contains("holiday"))
}

/// `date` field, then the page's day, then the file name.
fn holiday_date(page: &IndexedPage) -> Option<NaiveDate> {
    page.field("date")
        .and_then(resolve_field_date)
        .or(page.day)
        .or_else(|| parse_strict_date(&page.name))
}

fn holiday_title(page: &IndexedPage) -> &str {
    page.field("name")
        .and_then(|v| v.as_text())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&page.name)
}

#[async_trait]
impl TaskSource for HolidaySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Holiday
    }

    async fn get_tasks(&self, index: &dyn TaskIndex, env: &SourceEnv<'_>) -> Result<Vec<Task>> {
        let pages = index.pages(None, &is_holiday).await?;
        let tasks: Vec<Task> = pages
            .iter()
            .filter(|page| holiday_date(page) == Some(env.today))
            .map(|page| {
                Task::from_page(SourceKind::Holiday, &page.path, holiday_title(page), env.today)
            })
            .collect();

        log::debug!("Holiday source: {} holidays today", tasks.len());
        Ok(tasks)
    }
}
