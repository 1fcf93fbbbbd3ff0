//! Health Report Job
//!
//! Assembles a summary of recent health checks and emits it to the log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::error::JobResult;
use crate::healthlog::SharedHealthLog;
use crate::registry::{Job, JobContext};

pub struct HealthReportJob {
    log: SharedHealthLog,
    service: String,
    started_at: DateTime<Utc>,
}

impl HealthReportJob {
    pub fn new(log: SharedHealthLog, service: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            log,
            service: service.into(),
            started_at,
        }
    }
}

#[async_trait]
impl Job for HealthReportJob {
    async fn run(&self, ctx: JobContext) -> JobResult {
        let now = Utc::now();
        let summary = self.log.read().await.summary();
        let uptime = now.signed_duration_since(self.started_at);
        let status = if summary.errors == 0 { "healthy" } else { "degraded" };

        let report_data = json!({
            "timestamp": now.to_rfc3339(),
            "service": self.service,
            "uptime_seconds": uptime.num_seconds().max(0),
            "status": status,
            "checks_performed": summary.checks_performed,
            "errors": summary.errors,
            "last_status": summary.last_status,
            "last_checked_at": summary.last_checked_at,
        });

        info!("Health report generated: {}", report_data);

        Ok(json!({
            "status": "completed",
            "timestamp": now.to_rfc3339(),
            "task_type": "health_report",
            "report_data": report_data,
            "task_id": ctx.task_id,
        }))
    }
}
