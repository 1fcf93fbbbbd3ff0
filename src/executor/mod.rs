//! Executor Module
//!
//! Accepts submissions, hands them to the worker pool and answers status queries.
//!
//! `submit` stores a PENDING record and pushes the work onto a channel;
//! it never waits for the job to run.

mod worker;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::{Result, TaskError};
use crate::registry::{Job, Registry};
use crate::store::{ResultStore, TaskId, TaskRecord, TaskState};

pub use worker::WorkerPool;

use worker::fail_unstarted;

/// Work handed from a submitter to the pool.
pub(crate) struct Dispatch {
    pub id: TaskId,
    pub name: String,
    pub job: Arc<dyn Job>,
    pub args: Vec<Value>,
}

// == Task Status ==
/// Caller-facing projection of a task record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    pub id: TaskId,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<TaskRecord> for TaskStatus {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id().clone(),
            state: record.state(),
            result: record.result().cloned(),
            error: record.error().map(str::to_string),
        }
    }
}

// == Executor ==
/// Submission handle. Cheap to clone; all clones feed the same pool.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<Registry>,
    store: Arc<dyn ResultStore>,
    tx: mpsc::UnboundedSender<Dispatch>,
}

impl Executor {
    /// Creates an executor together with the worker pool that drains it.
    ///
    /// Dropping the returned [`WorkerPool`] stops the workers.
    pub fn start(
        registry: Arc<Registry>,
        store: Arc<dyn ResultStore>,
        workers: usize,
        job_timeout: Duration,
    ) -> (Self, WorkerPool) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pool = WorkerPool::spawn(workers.max(1), rx, Arc::clone(&store), job_timeout);
        let executor = Self {
            registry,
            store,
            tx,
        };
        (executor, pool)
    }

    // == Submit ==
    /// Queues a run of the named job and returns its id immediately.
    ///
    /// Unknown names fail with `NotFound` before any record is created.
    pub async fn submit(&self, name: &str, args: Vec<Value>) -> Result<TaskId> {
        let definition = self.registry.lookup(name)?;
        let id = TaskId::generate();

        self.store
            .put(TaskRecord::pending(id.clone(), name, Utc::now()))
            .await?;

        let dispatch = Dispatch {
            id: id.clone(),
            name: definition.name.clone(),
            job: Arc::clone(&definition.job),
            args,
        };

        if self.tx.send(dispatch).is_err() {
            error!(task_id = %id, task = name, "worker pool is gone, failing task");
            // Walk the record to a terminal state so pollers are not left on PENDING.
            fail_unstarted(self.store.as_ref(), &id).await?;
            return Err(TaskError::QueueClosed);
        }

        debug!(task_id = %id, task = name, "task queued");
        Ok(id)
    }

    /// Submits a job by name without arguments.
    pub async fn submit_task(&self, name: &str) -> Result<TaskId> {
        self.submit(name, Vec::new()).await
    }

    // == Status ==
    /// Current status of a task; `NotFound` for ids this store has never seen.
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let record = self.store.get(&TaskId::from(task_id)).await?;
        Ok(record.into())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }
}
