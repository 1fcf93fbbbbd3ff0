//! Health Probe Job
//!
//! Checks that the configured dependency accepts TCP connections.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::net::TcpStream;
use tracing::info;

use crate::error::{JobFailure, JobResult};
use crate::healthlog::{HealthLogEntry, SharedHealthLog};
use crate::registry::{Job, JobContext};

// == Dependency Status ==
/// Result of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyStatus {
    Reachable,
    Unreachable(String),
    /// No answer within the connect timeout
    TimedOut(Duration),
    /// No dependency address configured
    NotConfigured,
}

impl DependencyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DependencyStatus::Reachable => "healthy",
            DependencyStatus::Unreachable(_) => "unhealthy",
            DependencyStatus::TimedOut(_) => "timeout",
            DependencyStatus::NotConfigured => "not_configured",
        }
    }

    /// Whether the service may take traffic with this dependency status.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            DependencyStatus::Reachable | DependencyStatus::NotConfigured
        )
    }
}

/// Attempts a TCP connect to `target`, bounded by `timeout`.
pub async fn check_dependency(target: Option<&str>, timeout: Duration) -> DependencyStatus {
    let Some(target) = target else {
        return DependencyStatus::NotConfigured;
    };
    connect_within(timeout, TcpStream::connect(target)).await
}

/// Classifies a connection attempt, giving up after `timeout`.
pub async fn connect_within<T>(
    timeout: Duration,
    connect: impl Future<Output = io::Result<T>>,
) -> DependencyStatus {
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_)) => DependencyStatus::Reachable,
        Ok(Err(e)) => DependencyStatus::Unreachable(e.to_string()),
        Err(_) => DependencyStatus::TimedOut(timeout),
    }
}

// == Dependency Check ==
/// Source of dependency status for [`HealthProbeJob`].
#[async_trait]
pub trait DependencyCheck: Send + Sync {
    async fn check(&self) -> DependencyStatus;
}

/// TCP connect to an optional `host:port`.
#[derive(Debug, Clone)]
pub struct TcpDependency {
    target: Option<String>,
    timeout: Duration,
}

impl TcpDependency {
    pub fn new(target: Option<String>, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl DependencyCheck for TcpDependency {
    async fn check(&self) -> DependencyStatus {
        check_dependency(self.target.as_deref(), self.timeout).await
    }
}

// == Health Probe Job ==
pub struct HealthProbeJob {
    dependency: Arc<dyn DependencyCheck>,
    log: SharedHealthLog,
}

impl HealthProbeJob {
    pub fn new(dependency: Arc<dyn DependencyCheck>, log: SharedHealthLog) -> Self {
        Self { dependency, log }
    }

    /// Job that connects to `target` over TCP.
    pub fn tcp(target: Option<String>, timeout: Duration, log: SharedHealthLog) -> Self {
        Self::new(Arc::new(TcpDependency::new(target, timeout)), log)
    }
}

#[async_trait]
impl Job for HealthProbeJob {
    async fn run(&self, ctx: JobContext) -> JobResult {
        let status = self.dependency.check().await;
        let now = Utc::now();

        let mut entry = HealthLogEntry::new("dependency", status.label(), status.is_ready(), now);
        let detail = match &status {
            DependencyStatus::Unreachable(reason) => Some(reason.clone()),
            DependencyStatus::TimedOut(after) => Some(format!("no answer within {:?}", after)),
            _ => None,
        };
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.log.write().await.record(entry);

        info!(
            "Health check completed at {}. Dependency: {}",
            now.to_rfc3339(),
            status.label()
        );

        // A timeout is a failed run; an unreachable dependency is a completed check.
        if let DependencyStatus::TimedOut(after) = status {
            return Err(JobFailure::TimedOut(after));
        }

        Ok(json!({
            "status": "completed",
            "timestamp": now.to_rfc3339(),
            "dependency_status": status.label(),
            "task_id": ctx.task_id,
        }))
    }
}
