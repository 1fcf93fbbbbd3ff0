//! Diagnostic Job
//!
//! Trivial on-demand job for checking that the queue is alive.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::error::JobResult;
use crate::registry::{Job, JobContext};

pub struct TestJob;

#[async_trait]
impl Job for TestJob {
    async fn run(&self, ctx: JobContext) -> JobResult {
        Ok(json!({
            "message": "Test task completed successfully",
            "timestamp": Utc::now().to_rfc3339(),
            "task_id": ctx.task_id,
        }))
    }
}
