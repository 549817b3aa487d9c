// File: tests/move_task_safety.rs
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan::aggregator::TaskAggregator;
use dayplan::clock::FixedClock;
use dayplan::config::Config;
use dayplan::index::{MarkdownIndex, TaskIndex};
use dayplan::model::{SourceKind, Task};
use dayplan::mover::{MoveError, TaskMover};
use dayplan::vault::{MemoryVault, VaultStore};
use std::sync::Arc;

const SOURCE: &str = "Daily/2026/10.October/2026-10-15.md";
const TARGET: &str = "Daily/2026/10.October/2026-10-16.md";
const SOURCE_NOTE: &str = "# 2026-10-15\n- [ ] keep me\n- [ ] call the bank #finance\n- [ ] keep me too";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

/// A vault whose `write` fails for one path.
struct FailingWrites {
    inner: MemoryVault,
    fail_path: String,
}

#[async_trait]
impl VaultStore for FailingWrites {
    async fn read(&self, path: &str) -> Result<String> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        if path == self.fail_path {
            bail!("disk full");
        }
        self.inner.write(path, content).await
    }

    async fn create(&self, path: &str, content: &str) -> Result<()> {
        self.inner.create(path, content).await
    }

    async fn exists(&self, path: &str) -> bool {
        self.inner.exists(path).await
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        self.inner.create_folder(path).await
    }

    async fn list_folder(&self, folder: &str) -> Result<Vec<String>> {
        self.inner.list_folder(folder).await
    }
}

fn config() -> Config {
    Config {
        daily_note_path: "Daily".to_string(),
        ..Config::default()
    }
}

fn mover(vault: Arc<dyn VaultStore>, config: Config) -> TaskMover {
    TaskMover::new(vault, Arc::new(config), Arc::new(FixedClock::on(day(15))))
}

fn bank_task() -> Task {
    Task::from_checklist_item(
        SOURCE,
        2,
        "call the bank #finance",
        &["#finance".to_string()],
        day(15),
    )
}

#[tokio::test]
async fn test_move_writes_target_then_removes_source_line() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));
    let result = mover(vault.clone(), config())
        .move_task(&bank_task(), day(16))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.from_path, SOURCE);
    assert_eq!(result.to_path, TARGET);
    assert_eq!(result.task_text, "call the bank #finance");

    assert_eq!(
        vault.get(SOURCE).unwrap(),
        "# 2026-10-15\n- [ ] keep me\n- [ ] keep me too"
    );
    assert!(vault.get(TARGET).unwrap().ends_with("\n- [ ] call the bank #finance\n"));
}

#[tokio::test]
async fn test_delete_failure_keeps_both_copies_and_reports_success() {
    let inner = MemoryVault::new().with_file(SOURCE, SOURCE_NOTE);
    let vault = Arc::new(FailingWrites {
        inner,
        fail_path: SOURCE.to_string(),
    });

    let result = mover(vault.clone(), config())
        .move_task(&bank_task(), day(16))
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.error.as_deref().unwrap_or("").is_empty());
    assert_eq!(vault.inner.get(SOURCE).unwrap(), SOURCE_NOTE);
    assert!(vault.inner.get(TARGET).unwrap().contains("- [ ] call the bank #finance"));
}

#[tokio::test]
async fn test_write_failure_leaves_source_untouched() {
    let inner = MemoryVault::new()
        .with_file(SOURCE, SOURCE_NOTE)
        .with_file(TARGET, "# 2026-10-16\n");
    let vault = Arc::new(FailingWrites {
        inner,
        fail_path: TARGET.to_string(),
    });

    let err = mover(vault.clone(), config())
        .move_task(&bank_task(), day(16))
        .await
        .unwrap_err();

    assert!(matches!(err, MoveError::Write(_)));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(vault.inner.get(SOURCE).unwrap(), SOURCE_NOTE);
    assert_eq!(vault.inner.get(TARGET).unwrap(), "# 2026-10-16\n");
}

#[tokio::test]
async fn test_same_note_is_rejected_without_touching_files() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));
    let err = mover(vault.clone(), config())
        .move_task(&bank_task(), day(15))
        .await
        .unwrap_err();

    assert!(matches!(err, MoveError::SameNote(_)));
    assert_eq!(vault.get(SOURCE).unwrap(), SOURCE_NOTE);
    assert_eq!(vault.file_count(), 1);
}

#[tokio::test]
async fn test_past_dates_need_opt_in() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));

    let err = mover(vault.clone(), config())
        .move_task(&bank_task(), day(14))
        .await
        .unwrap_err();
    assert!(matches!(err, MoveError::PastDate));

    let permissive = Config {
        allow_move_to_past: true,
        ..config()
    };
    let result = mover(vault.clone(), permissive)
        .move_task(&bank_task(), day(14))
        .await
        .unwrap();
    assert_eq!(result.to_path, "Daily/2026/10.October/2026-10-14.md");
}

#[tokio::test]
async fn test_stale_references_are_rejected() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));
    let m = mover(vault.clone(), config());

    let mut beyond = bank_task();
    beyond.line = Some(40);
    assert!(matches!(
        m.move_task(&beyond, day(16)).await,
        Err(MoveError::LineOutOfRange { line: 40, len: 4, .. })
    ));

    // The note was edited since the task list was loaded.
    let mut shifted = bank_task();
    shifted.line = Some(1);
    assert!(matches!(
        m.move_task(&shifted, day(16)).await,
        Err(MoveError::StaleLine { line: 1, .. })
    ));

    assert_eq!(vault.get(SOURCE).unwrap(), SOURCE_NOTE);
    assert_eq!(vault.file_count(), 1);
}

#[tokio::test]
async fn test_only_daily_tasks_with_lines_move() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));
    let m = mover(vault, config());

    let holiday = Task::from_page(SourceKind::Holiday, "Holidays/x.md", "x", day(15));
    assert!(matches!(
        m.move_task(&holiday, day(16)).await,
        Err(MoveError::NotDailyTask)
    ));

    let recurring = Task::from_recurring("Stretch", SOURCE, day(15));
    assert!(matches!(
        m.move_task(&recurring, day(16)).await,
        Err(MoveError::NotDailyTask)
    ));

    let mut lineless = bank_task();
    lineless.line = None;
    assert!(matches!(
        m.move_task(&lineless, day(16)).await,
        Err(MoveError::MissingLine)
    ));
}

#[tokio::test]
async fn test_leading_slash_root_names_the_same_note() {
    let vault = Arc::new(MemoryVault::new().with_file(SOURCE, SOURCE_NOTE));
    let config = Config {
        daily_note_path: "/Daily/".to_string(),
        ..Config::default()
    };
    let index: Arc<dyn TaskIndex> = Arc::new(MarkdownIndex::new(vault.clone()));
    let agg = TaskAggregator::new(
        config.clone(),
        vault.clone(),
        Some(index),
        Arc::new(FixedClock::on(day(15))),
    );
    let tasks = agg.get_task_data().await.tasks;
    let bank = tasks
        .iter()
        .find(|t| t.text == "call the bank")
        .unwrap();
    assert_eq!(bank.file_path, SOURCE);

    let m = mover(vault.clone(), config);
    assert!(matches!(
        m.move_task(bank, day(15)).await,
        Err(MoveError::SameNote(_))
    ));
    assert_eq!(vault.get(SOURCE).unwrap(), SOURCE_NOTE);

    let result = m.move_task(bank, day(16)).await.unwrap();
    assert!(result.success);
    assert_eq!(result.to_path, TARGET);
    assert_eq!(vault.get(SOURCE).unwrap(), "# 2026-10-15\n- [ ] keep me\n- [ ] keep me too");
    assert!(vault.get("/Daily/2026/10.October/2026-10-16.md").unwrap().contains("call the bank"));
}
