//! Log Cleanup Job
//!
//! Prunes health log entries that fell out of the retention window.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::error::JobResult;
use crate::healthlog::SharedHealthLog;
use crate::registry::{Job, JobContext};

pub struct LogCleanupJob {
    log: SharedHealthLog,
    retention: Duration,
}

impl LogCleanupJob {
    pub fn new(log: SharedHealthLog, retention: Duration) -> Self {
        Self { log, retention }
    }
}

#[async_trait]
impl Job for LogCleanupJob {
    async fn run(&self, ctx: JobContext) -> JobResult {
        let now = Utc::now();

        let (removed, remaining) = {
            let mut log = self.log.write().await;
            // A retention reaching before the earliest representable time keeps everything
            let removed = now
                .checked_sub_signed(self.retention)
                .map_or(0, |cutoff| log.prune_older_than(cutoff));
            (removed, log.len())
        };

        if removed > 0 {
            info!("Log cleanup: removed {} stale health log entries", removed);
        } else {
            debug!("Log cleanup: no stale entries found");
        }

        Ok(json!({
            "status": "completed",
            "timestamp": now.to_rfc3339(),
            "task_type": "cleanup",
            "removed": removed,
            "remaining": remaining,
            "task_id": ctx.task_id,
        }))
    }
}
