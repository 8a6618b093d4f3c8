/// Disk-based storage adapter
use crate::{
    error::{LocalizerError, LocalizerResult},
    media_store::{StorageAdapter, WriteOutcome},
};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

/// Disk storage adapter
///
/// Stores files under `root`, mirroring the relative path structure
/// used in document references.
#[derive(Clone)]
pub struct DiskAdapter {
    root: PathBuf,
}

impl DiskAdapter {
    /// Create a new disk adapter rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a relative reference path onto the filesystem
    ///
    /// Rejects absolute paths and `..` so nothing is touched outside `root`.
    fn resolve(&self, path: &str) -> LocalizerResult<PathBuf> {
        let relative = Path::new(path);
        let mut resolved = self.root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(LocalizerError::Validation(format!(
                        "Path escapes storage root: {}",
                        path
                    )))
                }
            }
        }

        if resolved == self.root {
            return Err(LocalizerError::Validation(format!("Empty storage path: '{}'", path)));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl StorageAdapter for DiskAdapter {
    async fn exists(&self, path: &str) -> LocalizerResult<bool> {
        let file_path = self.resolve(path)?;

        fs::try_exists(&file_path).await.map_err(|e| {
            LocalizerError::Storage(format!("Failed to check {}: {}", path, e))
        })
    }

    async fn read_binary(&self, path: &str) -> LocalizerResult<Vec<u8>> {
        let file_path = self.resolve(path)?;

        fs::read(&file_path)
            .await
            .map_err(|e| LocalizerError::Storage(format!("Failed to read {}: {}", path, e)))
    }

    async fn create_binary(&self, path: &str, data: &[u8]) -> LocalizerResult<WriteOutcome> {
        let file_path = self.resolve(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                LocalizerError::Storage(format!("Failed to create directory for {}: {}", path, e))
            })?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Ok(WriteOutcome::AlreadyExists);
            }
            Err(e) => {
                return Err(LocalizerError::Storage(format!(
                    "Failed to create {}: {}",
                    path, e
                )))
            }
        };

        let written = match file.write_all(data).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            // The file is ours; don't leave a truncated image behind.
            let _ = fs::remove_file(&file_path).await;
            return Err(LocalizerError::Storage(format!(
                "Failed to write {}: {}",
                path, e
            )));
        }

        Ok(WriteOutcome::Written)
    }
}
