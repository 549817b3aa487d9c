// File: src/sources/recurring.rs
use super::{SourceEnv, TaskSource};
use crate::index::TaskIndex;
use crate::model::{SourceKind, Task};
use crate::reconcile::RecurringReconciler;
use anyhow::Result;
use async_trait::async_trait;

/// Recurring tasks already written to today's note and still open.
///
/// Rules that are due but not yet written are reported through
/// `TaskAggregator::get_pending_recurring_tasks` instead, so nothing is listed twice.
pub struct RecurringSource;

#[async_trait]
impl TaskSource for RecurringSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Recurring
    }

    async fn get_tasks(&self, _index: &dyn TaskIndex, env: &SourceEnv<'_>) -> Result<Vec<Task>> {
        let reconciled = RecurringReconciler::new(env.vault, env.config)
            .reconcile(env.today)
            .await?;
        Ok(reconciled.materialized)
    }
}
