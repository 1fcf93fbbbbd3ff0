//! Taskbeat - health endpoints backed by a background task queue
//!
//! Submits units of work to a worker pool, tracks each run by an opaque id,
//! and triggers the built-in maintenance jobs on fixed intervals.

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod healthlog;
pub mod jobs;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use error::{JobFailure, JobResult, Result, TaskError};
pub use executor::{Executor, TaskStatus, WorkerPool};
pub use registry::{Interval, IntervalUnit, Job, JobContext, JobDefinition, Registry};
pub use scheduler::Scheduler;
pub use store::{TaskId, TaskRecord, TaskState};
