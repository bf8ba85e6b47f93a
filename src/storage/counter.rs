use crate::ripper::{RipObserver, RipReport};
use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Rip counter kept in a flat file
///
/// Clones share one lock, so increments from concurrent rips are applied
/// one at a time and none are lost. A missing file reads as zero and is
/// created by the first increment.
#[derive(Debug, Clone)]
pub struct FileRipCounter {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileRipCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current count
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The stored count, or 0 if the file does not exist
    /// * `Err(StorageError)` - The file could not be read or is not a number
    pub async fn read(&self) -> StorageResult<u64> {
        let _held = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Adds one to the stored count and returns the new value
    pub async fn increment(&self) -> StorageResult<u64> {
        let _held = self.lock.lock().await;
        let count = self.read_unlocked().await? + 1;
        tokio::fs::write(&self.path, count.to_string()).await?;
        Ok(count)
    }

    async fn read_unlocked(&self) -> StorageResult<u64> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        content.trim().parse().map_err(|_| StorageError::Corrupt {
            path: self.path.display().to_string(),
            content,
        })
    }
}

impl RipObserver for FileRipCounter {
    /// Increments the count on a background task
    fn on_rip_completed(&self, report: &RipReport) {
        let counter = self.clone();
        let target = report.target.clone();

        tokio::spawn(async move {
            match counter.increment().await {
                Ok(count) => tracing::debug!("Rip count is now {} after {}", count, target),
                Err(e) => tracing::warn!("Failed to increment rip count: {}", e),
            }
        });
    }
}
