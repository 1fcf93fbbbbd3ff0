//! Task Record Module
//!
//! The tracked state of one execution instance.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, TaskError};

// == Task Id ==
/// Opaque, serializable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Allocates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Task State ==
/// Lifecycle state; only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Pending,
    Started,
    Success,
    Failure,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }

    /// Whether `self -> next` follows PENDING -> STARTED -> {SUCCESS|FAILURE}.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Started)
                | (TaskState::Started, TaskState::Success)
                | (TaskState::Started, TaskState::Failure)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "PENDING",
            TaskState::Started => "STARTED",
            TaskState::Success => "SUCCESS",
            TaskState::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

// == Transition ==
/// A requested state change, carrying the payload of the target state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Start,
    Succeed(Value),
    Fail(String),
}

impl Transition {
    pub fn target(&self) -> TaskState {
        match self {
            Transition::Start => TaskState::Started,
            Transition::Succeed(_) => TaskState::Success,
            Transition::Fail(_) => TaskState::Failure,
        }
    }
}

// == Task Record ==
/// One submission and everything known about its execution.
///
/// `result` is set only in SUCCESS and `error` only in FAILURE; the
/// fields are private so that only [`TaskRecord::apply`] can change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    state: TaskState,
    submitted_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<Value>,
    error: Option<String>,
}

impl TaskRecord {
    /// Creates a PENDING record.
    pub fn pending(id: TaskId, name: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            state: TaskState::Pending,
            submitted_at,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    // == Apply ==
    /// Returns the record as it looks after `transition`, leaving `self` untouched.
    pub fn apply(&self, transition: Transition, at: DateTime<Utc>) -> Result<Self> {
        let target = transition.target();
        if !self.state.can_transition_to(target) {
            return Err(TaskError::InvalidTransition {
                id: self.id.to_string(),
                from: self.state,
                to: target,
            });
        }

        let mut next = self.clone();
        next.state = target;
        match transition {
            Transition::Start => next.started_at = Some(at),
            Transition::Succeed(value) => {
                next.result = Some(value);
                next.completed_at = Some(at);
            }
            Transition::Fail(error) => {
                next.error = Some(error);
                next.completed_at = Some(at);
            }
        }
        Ok(next)
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
