//! Job Module
//!
//! The unit-of-work abstraction and the named definitions held by the registry.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::JobResult;
use crate::registry::Interval;
use crate::store::TaskId;

// == Job Context ==
/// What a unit of work sees when it runs.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Identifier of the task record this run reports into
    pub task_id: TaskId,
    /// Positional arguments given at submission
    pub args: Vec<Value>,
}

// == Job Trait ==
/// An executable unit of work.
///
/// Failures are returned as `JobFailure`; a panic is caught by the worker
/// and recorded the same way.
#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self, ctx: JobContext) -> JobResult;
}

/// Adapter turning an async closure into a [`Job`].
pub struct FnJob<F>(F);

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn(JobContext) -> Fut + Send + Sync,
    Fut: Future<Output = JobResult> + Send + 'static,
{
    async fn run(&self, ctx: JobContext) -> JobResult {
        (self.0)(ctx).await
    }
}

/// Wraps an async closure as a shareable job.
pub fn job_fn<F, Fut>(f: F) -> Arc<dyn Job>
where
    F: Fn(JobContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = JobResult> + Send + 'static,
{
    Arc::new(FnJob(f))
}

// == Job Definition ==
/// A named unit of work with an optional periodic schedule.
#[derive(Clone)]
pub struct JobDefinition {
    pub name: String,
    pub job: Arc<dyn Job>,
    /// `None` for on-demand jobs the scheduler never fires
    pub schedule: Option<Interval>,
}

impl JobDefinition {
    /// A job that only runs when submitted explicitly.
    pub fn on_demand(name: impl Into<String>, job: Arc<dyn Job>) -> Self {
        Self {
            name: name.into(),
            job,
            schedule: None,
        }
    }

    /// A job the scheduler submits on a fixed interval.
    pub fn periodic(name: impl Into<String>, job: Arc<dyn Job>, schedule: Interval) -> Self {
        Self {
            name: name.into(),
            job,
            schedule: Some(schedule),
        }
    }
}

impl fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDefinition")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
