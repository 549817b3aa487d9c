// Manages files on the local disk: locked atomic writes and the filesystem vault.
use crate::vault::{VaultStore, normalize_folder};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive advisory lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

/// A vault rooted at a directory on disk.
///
/// Writes go through `LocalStorage::atomic_write`, so a crash mid-write leaves either
/// the old or the new content, never a truncated note. Lock files are not used here:
/// they would show up as stray files inside the user's vault.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a vault path onto the disk, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(normalize_folder(path));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Invalid vault path: {}", path);
        }
        Ok(self.root.join(rel))
    }

    fn to_vault_path(&self, abs: &Path) -> Option<String> {
        let rel = abs.strip_prefix(&self.root).ok()?;
        Some(rel.to_string_lossy().replace('\\', "/"))
    }
}

#[async_trait]
impl VaultStore for FsVault {
    async fn read(&self, path: &str) -> Result<String> {
        let abs = self.resolve(path)?;
        tokio::fs::read_to_string(&abs)
            .await
            .with_context(|| format!("Failed to read {}", path))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let abs = self.resolve(path)?;
        if !abs.is_file() {
            bail!("File not found: {}", path);
        }
        let content = content.to_string();
        tokio::task::spawn_blocking(move || LocalStorage::atomic_write(&abs, content))
            .await
            .map_err(|e| anyhow!("write task failed: {}", e))?
            .with_context(|| format!("Failed to write {}", path))
    }

    async fn create(&self, path: &str, content: &str) -> Result<()> {
        let abs = self.resolve(path)?;
        let content = content.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            use std::io::Write;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&abs)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow!("create task failed: {}", e))?
        .with_context(|| format!("Failed to create {}", path))
    }

    async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(abs) => tokio::fs::try_exists(abs).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        let abs = self.resolve(path)?;
        if abs.is_dir() {
            return Ok(());
        }
        match tokio::fs::create_dir(&abs).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && abs.is_dir() => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to create folder {}", path)),
        }
    }

    async fn list_folder(&self, folder: &str) -> Result<Vec<String>> {
        let abs = self.resolve(folder)?;
        let vault = self.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let mut files = Vec::new();
            if !abs.is_dir() {
                return Ok(files);
            }
            for entry in WalkDir::new(&abs).follow_links(false) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                // Hidden files and folders (.obsidian, .trash, ...) are not notes.
                let rel = entry.path().strip_prefix(&abs).unwrap_or(entry.path());
                if rel.components().any(is_hidden) {
                    continue;
                }
                if let Some(p) = vault.to_vault_path(entry.path()) {
                    files.push(p);
                }
            }
            files.sort();
            Ok(files)
        })
        .await
        .map_err(|e| anyhow!("list task failed: {}", e))?
    }
}

fn is_hidden(c: Component<'_>) -> bool {
    matches!(c, Component::Normal(s) if s.to_string_lossy().starts_with('.'))
}
