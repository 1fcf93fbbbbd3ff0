//! Error types for the task service
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::TaskState;

// == Task Error Enum ==
/// Unified error type for the task core and its HTTP surface.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Unknown job name or unknown task id
    #[error("Not found: {0}")]
    NotFound(String),

    /// A job with this name is already registered
    #[error("Duplicate job name: {0}")]
    DuplicateName(String),

    /// A record with this task id already exists
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    /// Interval with a zero period
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Attempted to move a record backward or out of a terminal state
    #[error("Invalid transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TaskState,
        to: TaskState,
    },

    /// Schedule state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The worker pool is no longer accepting work
    #[error("Task queue is closed")]
    QueueClosed,
}

// == IntoResponse Implementation ==
impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = match &self {
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::DuplicateName(_) | TaskError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
            TaskError::DuplicateTask(_) => StatusCode::CONFLICT,
            TaskError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            TaskError::InvalidTransition { .. } | TaskError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// == Job Failure ==
/// Typed failure of a single unit of work.
///
/// The `Display` output is what ends up in `TaskRecord::error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobFailure {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("job panicked: {0}")]
    Panicked(String),
}

impl JobFailure {
    pub fn failed(msg: impl Into<String>) -> Self {
        JobFailure::Failed(msg.into())
    }
}

// == Result Type Aliases ==
/// Convenience Result type for the task core.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Outcome of a unit of work: a JSON payload or a typed failure.
pub type JobResult = std::result::Result<serde_json::Value, JobFailure>;
