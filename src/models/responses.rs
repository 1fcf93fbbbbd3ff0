//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::executor::TaskStatus;
use crate::healthlog::HealthSummary;
use crate::store::{TaskCounts, TaskId, TaskState};

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Response body for the liveness endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub checks: BTreeMap<String, String>,
}

impl HealthResponse {
    /// Creates a healthy response with current timestamp
    pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
        let mut checks = BTreeMap::new();
        checks.insert("application".to_string(), "running".to_string());
        Self {
            status: "healthy".to_string(),
            timestamp: now_rfc3339(),
            service: service.into(),
            version: version.into(),
            checks,
        }
    }
}

/// Response body for GET /health/detailed
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub environment: String,
    pub checks: BTreeMap<String, String>,
    /// Task counts per state
    pub tasks: TaskCounts,
    /// Registered job names
    pub jobs: Vec<String>,
    /// Summary of the health log
    pub health_log: HealthSummary,
}

/// Response body for the readiness probe (GET /health/ready)
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: String,
    pub service: String,
    pub checks: BTreeMap<String, String>,
}

impl ReadinessResponse {
    pub fn new(ready: bool, service: impl Into<String>, dependency: &str) -> Self {
        let mut checks = BTreeMap::new();
        checks.insert(
            "dependency".to_string(),
            if ready { "ready" } else { "not_ready" }.to_string(),
        );
        checks.insert("dependency_status".to_string(), dependency.to_string());
        checks.insert("application".to_string(), "ready".to_string());
        Self {
            ready,
            timestamp: now_rfc3339(),
            service: service.into(),
            checks,
        }
    }
}

/// Response body for task submission endpoints
#[derive(Debug, Clone, Serialize)]
pub struct TaskSubmittedResponse {
    pub message: String,
    pub task_id: TaskId,
    /// Always "queued"
    pub status: String,
    pub timestamp: String,
}

impl TaskSubmittedResponse {
    pub fn queued(task_name: &str, task_id: TaskId) -> Self {
        Self {
            message: format!("Task '{}' triggered successfully", task_name),
            task_id,
            status: "queued".to_string(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Response body for GET /health/task/status/:task_id
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub status: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl From<TaskStatus> for TaskStatusResponse {
    fn from(status: TaskStatus) -> Self {
        Self {
            task_id: status.id,
            status: status.state,
            result: status.result,
            error: status.error,
            timestamp: now_rfc3339(),
        }
    }
}
