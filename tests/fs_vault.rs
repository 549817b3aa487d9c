// File: tests/fs_vault.rs
use chrono::NaiveDate;
use dayplan::clock::FixedClock;
use dayplan::config::Config;
use dayplan::context::TestContext;
use dayplan::index::{MarkdownIndex, TaskIndex};
use dayplan::storage::FsVault;
use dayplan::vault::VaultStore;
use dayplan::writer::DailyNoteWriter;
use std::fs;
use std::sync::Arc;

fn vault_in(ctx: &TestContext) -> FsVault {
    let root = ctx.root.join("vault");
    fs::create_dir_all(&root).unwrap();
    FsVault::new(root)
}

#[tokio::test]
async fn test_create_write_and_read() {
    let ctx = TestContext::new();
    let vault = vault_in(&ctx);

    assert!(vault.create("Inbox/a.md", "x").await.is_err(), "parent must exist");
    vault.create_folder("Inbox").await.unwrap();
    vault.create_folder("Inbox").await.unwrap();
    vault.create("Inbox/a.md", "first").await.unwrap();
    assert!(vault.create("Inbox/a.md", "again").await.is_err());

    assert!(vault.exists("Inbox").await);
    assert!(vault.exists("Inbox/a.md").await);
    assert!(!vault.exists("Inbox/b.md").await);

    vault.write("Inbox/a.md", "second").await.unwrap();
    assert_eq!(vault.read("Inbox/a.md").await.unwrap(), "second");
    assert!(vault.write("Inbox/b.md", "nope").await.is_err(), "write needs an existing file");
}

#[tokio::test]
async fn test_paths_cannot_escape_the_vault() {
    let ctx = TestContext::new();
    let vault = vault_in(&ctx);
    fs::write(ctx.root.join("secret.md"), "hidden").unwrap();

    assert!(vault.read("../secret.md").await.is_err());
    assert!(!vault.exists("../secret.md").await);
    assert!(vault.create("../escape.md", "x").await.is_err());
}

#[tokio::test]
async fn test_listing_skips_hidden_entries() {
    let ctx = TestContext::new();
    let vault = vault_in(&ctx);
    let root = vault.root().to_path_buf();
    fs::create_dir_all(root.join("Daily/2026")).unwrap();
    fs::create_dir_all(root.join(".obsidian")).unwrap();
    fs::write(root.join("Daily/2026/2026-10-15.md"), "- [ ] a\n").unwrap();
    fs::write(root.join("Daily/.draft.md"), "- [ ] b\n").unwrap();
    fs::write(root.join(".obsidian/workspace.md"), "- [ ] c\n").unwrap();
    fs::write(root.join("top.md"), "").unwrap();

    let all = vault.list_folder("").await.unwrap();
    assert_eq!(all, vec!["Daily/2026/2026-10-15.md", "top.md"]);

    let daily = vault.list_folder("Daily/").await.unwrap();
    assert_eq!(daily, vec!["Daily/2026/2026-10-15.md"]);

    assert!(vault.list_folder("Missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_writer_and_index_on_disk() {
    let ctx = TestContext::new();
    let vault: Arc<dyn VaultStore> = Arc::new(vault_in(&ctx));
    let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
    let config = Config {
        daily_note_path: "Daily".to_string(),
        ..Config::default()
    };
    let writer = DailyNoteWriter::new(vault.clone(), Arc::new(config), Arc::new(FixedClock::on(today)));

    let path = writer.write_task("water the ferns", today).await.unwrap().path;
    assert_eq!(path, "Daily/2026/10.October/2026-10-15.md");
    assert!(ctx.root.join("vault").join(&path).is_file());

    let index = MarkdownIndex::new(vault);
    let tasks = index.open_tasks("Daily").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "water the ferns");
    assert_eq!(tasks[0].path, path);
}
