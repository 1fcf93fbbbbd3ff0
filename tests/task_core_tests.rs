//! Integration Tests for the Task Core
//!
//! Exercises registry, executor and result store through the public API only.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use taskbeat::registry::job_fn;
use taskbeat::store::InMemoryResultStore;
use taskbeat::{
    Executor, JobDefinition, JobFailure, Registry, TaskError, TaskId, TaskState, TaskStatus,
};
use tokio_test::{assert_err, assert_ok};

fn executor_with(registry: Registry) -> (Executor, taskbeat::WorkerPool) {
    Executor::start(
        Arc::new(registry),
        Arc::new(InMemoryResultStore::new()),
        2,
        Duration::from_millis(200),
    )
}

async fn wait_terminal(executor: &Executor, id: &TaskId) -> TaskStatus {
    for _ in 0..200 {
        let status = executor.get_task_status(id.as_str()).await.unwrap();
        if status.state.is_terminal() {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {} did not finish", id);
}

#[tokio::test]
async fn test_ping_scenario() {
    let mut registry = Registry::new();
    assert_ok!(registry.register(JobDefinition::on_demand(
        "ping",
        job_fn(|_| async { Ok(json!({"ok": true})) }),
    )));
    let (executor, _pool) = executor_with(registry);

    let id = executor.submit_task("ping").await.unwrap();
    let first = executor.get_task_status(id.as_str()).await.unwrap();
    assert!(matches!(
        first.state,
        TaskState::Pending | TaskState::Started | TaskState::Success
    ));

    let done = wait_terminal(&executor, &id).await;
    assert_eq!(done.state, TaskState::Success);
    assert_eq!(done.result, Some(json!({"ok": true})));

    // Polling again returns the same outcome
    let again = executor.get_task_status(id.as_str()).await.unwrap();
    assert_eq!(again, done);
}

#[tokio::test]
async fn test_nonexistent_scenario() {
    let (executor, _pool) = executor_with(Registry::new());

    let result = executor.submit_task("nonexistent").await;
    assert!(matches!(result, Err(TaskError::NotFound(_))));
    assert_eq!(executor.store().counts().await.total(), 0);

    assert_err!(executor.get_task_status("abc").await);
}

#[tokio::test]
async fn test_failing_job_is_captured() {
    let mut registry = Registry::new();
    assert_ok!(registry.register(JobDefinition::on_demand(
        "flaky",
        job_fn(|_| async { Err(JobFailure::failed("downstream refused connection")) }),
    )));
    let (executor, _pool) = executor_with(registry);

    let id = executor.submit_task("flaky").await.unwrap();
    let done = wait_terminal(&executor, &id).await;
    assert_eq!(done.state, TaskState::Failure);
    assert_eq!(done.error.as_deref(), Some("downstream refused connection"));
    assert!(done.result.is_none());
}

#[tokio::test]
async fn test_slow_job_times_out() {
    let mut registry = Registry::new();
    assert_ok!(registry.register(JobDefinition::on_demand(
        "slow",
        job_fn(|_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!(null))
        }),
    )));
    let (executor, _pool) = executor_with(registry);

    let id = executor.submit_task("slow").await.unwrap();
    let done = wait_terminal(&executor, &id).await;
    assert_eq!(done.state, TaskState::Failure);
    assert!(done.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_slow_job_does_not_block_others() {
    let mut registry = Registry::new();
    assert_ok!(registry.register(JobDefinition::on_demand(
        "slow",
        job_fn(|_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!(null))
        }),
    )));
    assert_ok!(registry.register(JobDefinition::on_demand(
        "fast",
        job_fn(|_| async { Ok(json!("quick")) }),
    )));
    let (executor, _pool) = executor_with(registry);

    let _slow = executor.submit_task("slow").await.unwrap();
    let fast = executor.submit_task("fast").await.unwrap();

    let done = wait_terminal(&executor, &fast).await;
    assert_eq!(done.state, TaskState::Success);
}
