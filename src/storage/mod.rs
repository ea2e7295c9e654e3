//! Object storage for uploaded audio.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, warn};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`. Existing objects are never overwritten.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove the given keys, returning how many objects were deleted.
    /// Missing or unremovable objects are logged and skipped.
    async fn remove(&self, keys: &[String]) -> Result<usize>;

    /// Location clients can use to fetch the object.
    fn public_path(&self, key: &str) -> String;
}

/// Build `<meeting_id>/<uuid>.<ext>` from an uploaded file name. The
/// extension falls back to `webm`.
pub fn object_key(meeting_id: &str, file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("webm");

    format!("{}/{}.{}", meeting_id, uuid::Uuid::new_v4(), ext)
}

/// Final path segment of a key, used as the upload file name for STT.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().filter(|name| !name.is_empty()).unwrap_or("recording.webm")
}

/// Filesystem bucket rooted at a directory.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            bail!("Invalid object key: {}", key);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create object directory")?;
        }

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            bail!("Object already exists: {}", key);
        }

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write object {}", key))?;
        debug!("Stored object {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read object {}", key))
    }

    async fn remove(&self, keys: &[String]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            let path = match self.resolve(key) {
                Ok(path) => path,
                Err(e) => {
                    error!("Skipping object {}: {:#}", key, e);
                    continue;
                }
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Object {} already missing", key);
                }
                Err(e) => {
                    error!("Failed to remove object {}: {}", key, e);
                }
            }
        }
        Ok(removed)
    }

    fn public_path(&self, key: &str) -> String {
        self.root.join(key).to_string_lossy().to_string()
    }
}
