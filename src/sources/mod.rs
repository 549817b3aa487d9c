// File: src/sources/mod.rs
//! The four places open tasks come from.
//!
//! Each source implements `TaskSource`; the aggregator walks `standard_sources()`
//! in its fixed order (daily, project calendar, holiday, recurring). Errors are
//! returned to the aggregator, which records them per source.
pub mod daily;
pub mod holiday;
pub mod project;
pub mod recurring;

use crate::config::Config;
use crate::index::{FieldValue, TaskIndex};
use crate::model::{SourceKind, Task};
use crate::paths::parse_strict_date;
use crate::vault::VaultStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

pub use daily::DailySource;
pub use holiday::HolidaySource;
pub use project::ProjectCalendarSource;
pub use recurring::RecurringSource;

/// What a source may look at besides the index.
pub struct SourceEnv<'a> {
    pub config: &'a Config,
    pub vault: &'a dyn VaultStore,
    pub today: NaiveDate,
}

#[async_trait]
pub trait TaskSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn get_tasks(&self, index: &dyn TaskIndex, env: &SourceEnv<'_>) -> Result<Vec<Task>>;
}

pub fn standard_sources() -> Vec<Box<dyn TaskSource>> {
    vec![
        Box::new(DailySource),
        Box::new(ProjectCalendarSource),
        Box::new(HolidaySource),
        Box::new(RecurringSource),
    ]
}

/// Date carried by a frontmatter value: a date object, a strict `YYYY-MM-DD` /
/// `YYYY/MM/DD` string, or a millisecond timestamp.
pub fn resolve_field_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(dt) => Some(dt.date()),
        FieldValue::Text(s) => parse_strict_date(s.trim()),
        FieldValue::Number(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64)
            .map(|dt| dt.with_timezone(&Local).date_naive()),
        _ => None,
    }
}
