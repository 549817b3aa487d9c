// File: tests/source_filtering.rs
use chrono::NaiveDate;
use dayplan::aggregator::TaskAggregator;
use dayplan::clock::FixedClock;
use dayplan::config::Config;
use dayplan::index::{MarkdownIndex, TaskIndex};
use dayplan::model::SourceKind;
use dayplan::vault::{MemoryVault, VaultStore};
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

fn seeded_vault() -> MemoryVault {
    MemoryVault::new()
        // Daily notes
        .with_file(
            "Daily/2026/10.October/2026-10-12.md",
            "# 2026-10-12\n- [ ] overdue thing #meeting\n- [x] finished thing\n",
        )
        .with_file(
            "Daily/2026/10.October/2026-10-15.md",
            "---\ndate: 2026-10-15\n---\n# 2026-10-15\n\n- [ ] today thing\n",
        )
        .with_file("Daily/2026/10.October/2026-10-16.md", "- [ ] future thing\n")
        .with_file("Daily/2026/10.October/scratch.md", "- [ ] undated thing\n")
        .with_file("Daily/2026/10.October/2026-10-5.md", "- [ ] sloppy name\n")
        // Project calendar
        .with_file(
            "Projects/Alpha/events/Kickoff.md",
            "---\nDone: false\nDue Date: 2026-10-10\n---\n",
        )
        .with_file(
            "Projects/Alpha/Events/Launch.md",
            "---\nDone: false\nDue Date: 2026/10/15\n---\n",
        )
        .with_file(
            "Projects/Alpha/events/Retro.md",
            "---\nDone: false\nDue Date: 2026-10-20\n---\n",
        )
        .with_file(
            "Projects/Alpha/events/Finished.md",
            "---\nDone: true\nDue Date: 2026-10-01\n---\n",
        )
        .with_file(
            "Projects/Alpha/events/NotAnEvent.md",
            "---\nDue Date: 2026-10-01\n---\n",
        )
        .with_file(
            "Projects/Alpha/notes/Meeting notes.md",
            "---\nDone: false\nDue Date: 2026-10-01\n---\n",
        )
        // Holidays
        .with_file(
            "Holidays/2026-10-15.md",
            "---\ntags: [holiday]\nname: Founders Day\n---\n",
        )
        .with_file(
            "Holidays/Yesterday.md",
            "---\ntype: [holiday, observance]\ndate: 2026-10-14\n---\n",
        )
        .with_file(
            "Holidays/Harvest.md",
            "---\ntype: holiday\ndate: 2026-10-15\n---\n",
        )
        .with_file(
            "Holidays/Tomorrow.md",
            "---\ntags: [holiday]\nname: Tomorrow Fest\ndate: 2026-10-16\n---\n",
        )
        .with_file("Notes/random.md", "Nothing here #holidayish\n")
}

fn config() -> Config {
    Config {
        daily_note_path: "Daily".to_string(),
        project_calendar_path: "Projects".to_string(),
        ..Config::default()
    }
}

fn aggregator(vault: Arc<MemoryVault>, config: Config) -> TaskAggregator {
    let index: Arc<dyn TaskIndex> = Arc::new(MarkdownIndex::new(vault.clone()));
    TaskAggregator::new(config, vault, Some(index), Arc::new(FixedClock::on(today())))
}

#[tokio::test]
async fn test_all_sources_merged_in_order() {
    let agg = aggregator(Arc::new(seeded_vault()), config());
    let result = agg.get_task_data().await;

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let texts: Vec<(SourceKind, &str)> = result
        .tasks
        .iter()
        .map(|t| (t.source, t.text.as_str()))
        .collect();
    assert_eq!(
        texts,
        vec![
            (SourceKind::Daily, "overdue thing"),
            (SourceKind::Daily, "today thing"),
            // vault listing order: "Events/" sorts before "events/"
            (SourceKind::ProjectCalendar, "Launch"),
            (SourceKind::ProjectCalendar, "Kickoff"),
            (SourceKind::Holiday, "Founders Day"),
            (SourceKind::Holiday, "Harvest"),
        ]
    );

    assert_eq!(result.counts.daily, 2);
    assert_eq!(result.counts.project_calendar, 2);
    assert_eq!(result.counts.holiday, 2);
    assert_eq!(result.counts.recurring, 0);
}

#[tokio::test]
async fn test_old_notes_carry_forward_and_tomorrow_is_excluded() {
    let agg = aggregator(Arc::new(seeded_vault()), config());
    let result = agg.get_task_data().await;

    // Three days old and still open.
    let overdue = result
        .tasks
        .iter()
        .find(|t| t.text == "overdue thing")
        .unwrap();
    assert_eq!(overdue.source, SourceKind::Daily);
    assert_eq!(overdue.due_date.as_deref(), Some("2026-10-12"));

    assert!(!result.tasks.iter().any(|t| t.text == "future thing"));
    assert!(!result.tasks.iter().any(|t| t.text == "Tomorrow Fest"));
    assert!(!result.tasks.iter().any(|t| t.file_path == "Holidays/Tomorrow.md"));
}

#[tokio::test]
async fn test_daily_task_fields() {
    let agg = aggregator(Arc::new(seeded_vault()), config());
    let result = agg.get_task_data().await;

    let overdue = &result.tasks[0];
    assert_eq!(overdue.id, "Daily/2026/10.October/2026-10-12.md:1");
    assert_eq!(overdue.line, Some(1));
    assert_eq!(overdue.full_text, "overdue thing #meeting");
    assert!(overdue.is_meeting);
    assert_eq!(overdue.due_date.as_deref(), Some("2026-10-12"));
    assert_eq!(overdue.source_label, "📅 Daily");

    let today_task = &result.tasks[1];
    assert_eq!(today_task.line, Some(5));
    assert!(!today_task.is_meeting);
}

#[tokio::test]
async fn test_project_and_holiday_fields() {
    let agg = aggregator(Arc::new(seeded_vault()), config());
    let result = agg.get_task_data().await;

    let kickoff = result
        .tasks
        .iter()
        .find(|t| t.text == "Kickoff")
        .unwrap();
    assert_eq!(kickoff.id, "Projects/Alpha/events/Kickoff.md:0");
    assert_eq!(kickoff.due_date.as_deref(), Some("2026-10-10"));

    let holiday = result
        .tasks
        .iter()
        .find(|t| t.source == SourceKind::Holiday)
        .unwrap();
    assert_eq!(holiday.file_path, "Holidays/2026-10-15.md");
    assert_eq!(holiday.due_date.as_deref(), Some("2026-10-15"));
}

#[tokio::test]
async fn test_disabled_source_is_skipped() {
    let mut cfg = config();
    cfg.sources.holiday = false;
    cfg.sources.project_calendar = false;
    let agg = aggregator(Arc::new(seeded_vault()), cfg);

    let result = agg.get_task_data().await;
    assert!(result.tasks.iter().all(|t| t.source == SourceKind::Daily));
    assert_eq!(result.counts.holiday, 0);
}

#[tokio::test]
async fn test_unconfigured_or_missing_roots_yield_nothing() {
    let vault = Arc::new(seeded_vault());

    let unconfigured = aggregator(vault.clone(), Config::default());
    let result = unconfigured.get_task_data().await;
    assert!(result.errors.is_empty());
    assert_eq!(result.counts.daily, 0);
    assert_eq!(result.counts.project_calendar, 0);
    // Holidays are looked up across the whole vault regardless.
    assert_eq!(result.counts.holiday, 2);

    let missing = aggregator(
        vault.clone(),
        Config {
            daily_note_path: "Journal".to_string(),
            project_calendar_path: "Nope".to_string(),
            ..Config::default()
        },
    );
    let result = missing.get_task_data().await;
    assert!(result.errors.is_empty());
    assert_eq!(result.counts.daily + result.counts.project_calendar, 0);
    assert!(!vault.exists("Journal").await);
}

#[tokio::test]
async fn test_timestamp_due_date() {
    // 2026-10-01T12:00:00Z in milliseconds
    let vault = MemoryVault::new().with_file(
        "Projects/events/Stamp.md",
        "---\nDone: false\nDue Date: 1790856000000\n---\n",
    );
    let agg = aggregator(Arc::new(vault), config());
    let result = agg.get_task_data().await;
    assert_eq!(result.counts.project_calendar, 1);
    assert_eq!(result.tasks[0].due_date.as_deref(), Some("2026-10-01"));
}
