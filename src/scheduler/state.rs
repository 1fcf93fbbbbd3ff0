//! Schedule State Module
//!
//! Durable `last_run_at` per periodic job name.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Result, TaskError};

/// Storage interface for schedule state.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Every persisted `last_run_at`, keyed by job name.
    async fn load_all(&self) -> Result<HashMap<String, DateTime<Utc>>>;

    /// Records that `name` was last enqueued at `at`.
    async fn save(&self, name: &str, at: DateTime<Utc>) -> Result<()>;
}

// == Memory Store ==
/// Non-durable store, used in tests and when no state file is wanted.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    runs: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn load_all(&self) -> Result<HashMap<String, DateTime<Utc>>> {
        Ok(self.runs.lock().await.clone())
    }

    async fn save(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        self.runs.lock().await.insert(name.to_string(), at);
        Ok(())
    }
}

// == File Store ==
/// JSON object `{job_name: rfc3339 timestamp}` on disk.
///
/// Every save rewrites the whole file through a temporary file and a rename.
#[derive(Debug)]
pub struct FileScheduleStore {
    path: PathBuf,
    runs: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl FileScheduleStore {
    /// Opens the store, reading any existing state.
    ///
    /// A missing file starts empty. An unparsable file is logged and
    /// replaced on the next save.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let runs: HashMap<String, DateTime<Utc>> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring unreadable schedule state {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(TaskError::Persistence(format!(
                    "reading {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            runs: Mutex::new(runs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, runs: &HashMap<String, DateTime<Utc>>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(runs)
            .map_err(|e| TaskError::Persistence(format!("encoding schedule state: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| TaskError::Persistence(format!("writing {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            TaskError::Persistence(format!("replacing {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl ScheduleStore for FileScheduleStore {
    async fn load_all(&self) -> Result<HashMap<String, DateTime<Utc>>> {
        Ok(self.runs.lock().await.clone())
    }

    async fn save(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        // Held across the write so concurrent saves cannot interleave on disk
        let mut runs = self.runs.lock().await;
        runs.insert(name.to_string(), at);
        self.write(&runs).await
    }
}
