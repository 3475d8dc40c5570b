//! JSON-file-backed throttle store.
//!
//! One document per trigger id under a fixed namespace prefix in the state
//! directory — the device-local analogue of the original's
//! `throttle:{trigger_id}` browser-storage keys.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::record::ThrottleRecord;
use crate::traits::ThrottleStore;

/// Namespace prefix shared by every record file.
const NAMESPACE_PREFIX: &str = "throttle-";

/// Device-local store persisting records as JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, trigger_id: &str) -> PathBuf {
        // Trigger ids come from the backend; keep them filesystem-safe.
        let safe: String = trigger_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{NAMESPACE_PREFIX}{safe}.json"))
    }

    async fn try_read(&self, path: &Path) -> Result<ThrottleRecord, StoreError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn try_write(&self, path: &Path, record: &ThrottleRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(record)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ThrottleStore for FileStore {
    async fn read(&self, trigger_id: &str) -> Option<ThrottleRecord> {
        let path = self.path_for(trigger_id);
        match self.try_read(&path).await {
            Ok(record) => Some(record),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                // Corrupted or unreadable entry: treat as absent.
                warn!(trigger_id, error = %e, "discarding unreadable throttle record");
                None
            }
        }
    }

    async fn write(&self, trigger_id: &str, record: &ThrottleRecord) {
        let path = self.path_for(trigger_id);
        if let Err(e) = self.try_write(&path, record).await {
            warn!(trigger_id, error = %e, "throttle record write failed");
        }
    }

    async fn clear(&self, trigger_id: &str) {
        let path = self.path_for(trigger_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(trigger_id, "throttle record cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(trigger_id, error = %e, "throttle record clear failed"),
        }
    }
}
