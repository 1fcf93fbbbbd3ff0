//! Worker Pool
//!
//! Tokio tasks that drain the dispatch channel and run jobs to completion.
//!
//! On shutdown the channel is closed and whatever is still queued is failed
//! with "Task queue is closed", so no record is left PENDING.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{JobFailure, JobResult, Result, TaskError};
use crate::executor::Dispatch;
use crate::registry::{Job, JobContext};
use crate::store::{ResultStore, TaskId, Transition};

type SharedReceiver = Arc<Mutex<mpsc::UnboundedReceiver<Dispatch>>>;

// == Worker Pool ==
/// Handle over the running workers.
///
/// Dropping the pool (or calling [`WorkerPool::request_shutdown`]) stops
/// workers from taking new work; in-flight jobs still complete and queued
/// ones are failed.
pub struct WorkerPool {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn spawn(
        size: usize,
        rx: mpsc::UnboundedReceiver<Dispatch>,
        store: Arc<dyn ResultStore>,
        job_timeout: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let rx: SharedReceiver = Arc::new(Mutex::new(rx));

        let joins = (0..size)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let store = Arc::clone(&store);
                let shutdown_rx = shutdown_rx.clone();
                tokio::spawn(worker_loop(worker_id, rx, store, job_timeout, shutdown_rx))
            })
            .collect();

        info!("Started {} task workers (job timeout {:?})", size, job_timeout);
        Self { shutdown_tx, joins }
    }

    pub fn size(&self) -> usize {
        self.joins.len()
    }

    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Stops taking new work and waits for every worker to exit.
    ///
    /// When this returns every submitted record is terminal.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
        info!("Task workers stopped");
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: SharedReceiver,
    store: Arc<dyn ResultStore>,
    job_timeout: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let dispatch = tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            dispatch = next_dispatch(&rx) => dispatch,
        };

        // All submitters dropped
        let Some(dispatch) = dispatch else {
            break;
        };

        execute(worker_id, store.as_ref(), job_timeout, dispatch).await;
    }

    fail_queued(worker_id, &rx, store.as_ref()).await;
    debug!(worker_id, "worker exiting");
}

async fn next_dispatch(rx: &Mutex<mpsc::UnboundedReceiver<Dispatch>>) -> Option<Dispatch> {
    rx.lock().await.recv().await
}

// == Drain ==
/// Closes the channel and fails every dispatch still waiting in it.
///
/// Later sends see a closed channel, which `Executor::submit` reports as
/// `QueueClosed`. Each exiting worker runs this; after the first one the
/// queue is already empty.
async fn fail_queued(
    worker_id: usize,
    rx: &Mutex<mpsc::UnboundedReceiver<Dispatch>>,
    store: &dyn ResultStore,
) {
    let mut rx = rx.lock().await;
    rx.close();

    let mut failed = 0usize;
    while let Ok(dispatch) = rx.try_recv() {
        if let Err(e) = fail_unstarted(store, &dispatch.id).await {
            warn!(
                worker_id,
                task_id = %dispatch.id,
                task = %dispatch.name,
                "cannot fail queued task: {}",
                e
            );
        }
        failed += 1;
    }

    if failed > 0 {
        warn!(worker_id, "Failed {} queued task(s) at shutdown", failed);
    }
}

/// Walks a PENDING record through STARTED to FAILURE without running it.
pub(crate) async fn fail_unstarted(store: &dyn ResultStore, id: &TaskId) -> Result<()> {
    store.transition(id, Transition::Start).await?;
    store
        .transition(id, Transition::Fail(TaskError::QueueClosed.to_string()))
        .await?;
    Ok(())
}

// == Execute ==
/// Runs one dispatch: STARTED, then SUCCESS or FAILURE.
async fn execute(
    worker_id: usize,
    store: &dyn ResultStore,
    job_timeout: Duration,
    dispatch: Dispatch,
) {
    let Dispatch { id, name, job, args } = dispatch;

    if let Err(e) = store.transition(&id, Transition::Start).await {
        warn!(worker_id, task_id = %id, task = %name, "cannot start task: {}", e);
        return;
    }
    debug!(worker_id, task_id = %id, task = %name, "task started");

    let ctx = JobContext {
        task_id: id.clone(),
        args,
    };
    let transition = match run_job(job, ctx, job_timeout).await {
        Ok(value) => {
            info!(task_id = %id, task = %name, "task succeeded");
            Transition::Succeed(value)
        }
        Err(failure) => {
            warn!(task_id = %id, task = %name, "task failed: {}", failure);
            Transition::Fail(failure.to_string())
        }
    };

    if let Err(e) = store.transition(&id, transition).await {
        warn!(worker_id, task_id = %id, task = %name, "cannot record outcome: {}", e);
    }
}

/// Runs the job on its own task so a panic or overrun cannot take the worker down.
async fn run_job(job: Arc<dyn Job>, ctx: JobContext, job_timeout: Duration) -> JobResult {
    let mut handle = tokio::spawn(async move { job.run(ctx).await });

    match tokio::time::timeout(job_timeout, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) if join_err.is_panic() => {
            Err(JobFailure::Panicked(panic_message(join_err.into_panic())))
        }
        Ok(Err(join_err)) => Err(JobFailure::failed(join_err.to_string())),
        Err(_) => {
            handle.abort();
            Err(JobFailure::TimedOut(job_timeout))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
