// File: src/aggregator.rs
//! Fans a query out to every enabled task source and merges the results.
//!
//! The merged `TaskDataResult` is cached for `TASK_DATA_TTL`; mutations elsewhere call
//! `invalidate_cache` so the next query sees them.
use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::Config;
use crate::index::TaskIndex;
use crate::model::{PendingRecurringTask, SourceError, SourceKind, Task, TaskDataResult};
use crate::reconcile::RecurringReconciler;
use crate::sources::{SourceEnv, TaskSource, standard_sources};
use crate::vault::VaultStore;
use std::sync::Arc;
use tokio::sync::RwLock;

const INDEX_UNAVAILABLE: &str = "Task index is not available";

pub struct TaskAggregator {
    config: RwLock<Arc<Config>>,
    vault: Arc<dyn VaultStore>,
    index: RwLock<Option<Arc<dyn TaskIndex>>>,
    clock: Arc<dyn Clock>,
    sources: Vec<Box<dyn TaskSource>>,
    cache: TtlCache<TaskDataResult>,
}

impl TaskAggregator {
    pub fn new(
        config: Config,
        vault: Arc<dyn VaultStore>,
        index: Option<Arc<dyn TaskIndex>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            vault,
            index: RwLock::new(index),
            clock,
            sources: standard_sources(),
            cache: TtlCache::default(),
        }
    }

    /// Replaces the source list. Sources still run in the given order.
    pub fn with_sources(mut self, sources: Vec<Box<dyn TaskSource>>) -> Self {
        self.sources = sources;
        self
    }

    pub async fn config(&self) -> Arc<Config> {
        self.config.read().await.clone()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Attaches (or detaches) the index. Invalidates the cache.
    pub async fn set_index(&self, index: Option<Arc<dyn TaskIndex>>) {
        *self.index.write().await = index;
        self.cache.invalidate();
    }

    pub async fn get_task_data(&self) -> TaskDataResult {
        if let Some(cached) = self.cache.get() {
            return cached;
        }

        let Some(index) = self.index.read().await.clone() else {
            log::warn!("{}", INDEX_UNAVAILABLE);
            return TaskDataResult::unavailable(INDEX_UNAVAILABLE);
        };
        let config = self.config().await;
        let env = SourceEnv {
            config: &config,
            vault: self.vault.as_ref(),
            today: self.clock.today(),
        };

        let mut tasks = Vec::new();
        let mut errors = Vec::new();
        for source in &self.sources {
            let kind = source.kind();
            if !config.sources.is_enabled(kind) {
                continue;
            }
            match source.get_tasks(index.as_ref(), &env).await {
                Ok(mut found) => tasks.append(&mut found),
                Err(e) => {
                    log::warn!("Failed to get {} tasks: {:#}", kind, e);
                    errors.push(SourceError {
                        source: kind.to_string(),
                        message: format!("{:#}", e),
                        recoverable: true,
                    });
                }
            }
        }

        let result = TaskDataResult::new(tasks, errors);
        self.cache.store(result.clone());
        result
    }

    pub async fn get_today_tasks(&self) -> Vec<Task> {
        self.get_task_data().await.tasks
    }

    pub async fn get_task_count(&self) -> usize {
        self.get_task_data().await.tasks.len()
    }

    /// Recurring rules due today that are not in today's note yet. Never fails.
    pub async fn get_pending_recurring_tasks(&self) -> Vec<PendingRecurringTask> {
        let config = self.config().await;
        if !config.sources.is_enabled(SourceKind::Recurring) || !config.is_daily_configured() {
            return vec![];
        }
        let reconciler = RecurringReconciler::new(self.vault.as_ref(), &config);
        match reconciler.reconcile(self.clock.today()).await {
            Ok(r) => r.pending,
            Err(e) => {
                log::warn!("Failed to get pending recurring tasks: {:#}", e);
                vec![]
            }
        }
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    pub async fn update_settings(&self, config: Config) {
        *self.config.write().await = Arc::new(config);
        self.cache.invalidate();
    }
}
