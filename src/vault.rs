// File: src/vault.rs
//! The file-storage capability the engine runs against.
//!
//! Paths are vault-relative and always use `/` as separator. The disk-backed
//! implementation lives in `storage.rs`; `MemoryVault` keeps everything in a map and
//! is what embedding hosts use for previews and what the test-suite runs against.
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Full text of an existing file.
    async fn read(&self, path: &str) -> Result<String>;

    /// Replaces the content of an existing file.
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Creates a new file. Fails if it already exists.
    async fn create(&self, path: &str, content: &str) -> Result<()>;

    /// True for existing files and folders.
    async fn exists(&self, path: &str) -> bool;

    /// Creates one folder. Succeeds if it already exists.
    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Every file below `folder`, recursively. An empty folder string lists the whole vault.
    async fn list_folder(&self, folder: &str) -> Result<Vec<String>>;
}

/// Parent folder of a vault path (`""` for top-level files).
pub fn parent_folder(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// Normalizes a vault path or folder: trims whitespace and leading/trailing slashes.
pub fn normalize_folder(folder: &str) -> &str {
    folder.trim().trim_matches('/')
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
}

/// In-memory vault.
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<MemoryState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file (and its parent folders) without going through the async API.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: &str, content: &str) {
        let path = normalize_folder(path);
        if let Ok(mut state) = self.state.lock() {
            Self::register_parents(&mut state, path);
            state.files.insert(path.to_string(), content.to_string());
        }
    }

    /// Synchronous read, for assertions.
    pub fn get(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .ok()?
            .files
            .get(normalize_folder(path))
            .cloned()
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().map(|s| s.files.len()).unwrap_or(0)
    }

    fn register_parents(state: &mut MemoryState, path: &str) {
        let mut folder = parent_folder(path);
        while !folder.is_empty() {
            state.folders.insert(folder.to_string());
            folder = parent_folder(folder);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory vault lock poisoned"))
    }
}

#[async_trait]
impl VaultStore for MemoryVault {
    async fn read(&self, path: &str) -> Result<String> {
        let path = normalize_folder(path);
        self.lock()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {}", path))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let path = normalize_folder(path);
        let mut state = self.lock()?;
        match state.files.get_mut(path) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(anyhow!("File not found: {}", path)),
        }
    }

    async fn create(&self, path: &str, content: &str) -> Result<()> {
        let path = normalize_folder(path);
        let mut state = self.lock()?;
        if state.files.contains_key(path) {
            return Err(anyhow!("File already exists: {}", path));
        }
        let parent = parent_folder(path);
        if !parent.is_empty() && !state.folders.contains(parent) {
            return Err(anyhow!("Folder does not exist: {}", parent));
        }
        state.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        let path = normalize_folder(path);
        match self.state.lock() {
            Ok(state) => state.files.contains_key(path) || state.folders.contains(path),
            Err(_) => false,
        }
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        let path = normalize_folder(path);
        if path.is_empty() {
            return Ok(());
        }
        let mut state = self.lock()?;
        if state.files.contains_key(path) {
            return Err(anyhow!("A file already exists at {}", path));
        }
        let parent = parent_folder(path);
        if !parent.is_empty() && !state.folders.contains(parent) {
            return Err(anyhow!("Folder does not exist: {}", parent));
        }
        state.folders.insert(path.to_string());
        Ok(())
    }

    async fn list_folder(&self, folder: &str) -> Result<Vec<String>> {
        let folder = normalize_folder(folder);
        let state = self.lock()?;
        let prefix = format!("{}/", folder);
        Ok(state
            .files
            .keys()
            .filter(|p| folder.is_empty() || p.starts_with(&prefix))
            .cloned()
            .collect())
    }
}
