//! API Handlers
//!
//! HTTP request handlers for the health and task endpoints. The task
//! handlers are thin wrappers over [`Executor`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::executor::{Executor, WorkerPool};
use crate::healthlog::{HealthLog, SharedHealthLog};
use crate::jobs::{self, check_dependency, DependencyStatus};
use crate::models::{
    DetailedHealthResponse, HealthResponse, ReadinessResponse, TaskStatusResponse,
    TaskSubmittedResponse,
};
use crate::registry::Registry;
use crate::store::InMemoryResultStore;

/// Static service metadata and probe settings.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub probe_target: Option<String>,
    pub probe_timeout: Duration,
}

impl ServiceInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.service_name.clone(),
            version: config.service_version.clone(),
            environment: config.environment.clone(),
            probe_target: config.probe_target.clone(),
            probe_timeout: config.probe_timeout(),
        }
    }

    async fn check_dependency(&self) -> DependencyStatus {
        check_dependency(self.probe_target.as_deref(), self.probe_timeout).await
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Task submission and status
    pub executor: Executor,
    /// Health check history written by the probe job
    pub health_log: SharedHealthLog,
    pub service: Arc<ServiceInfo>,
}

impl AppState {
    pub fn new(executor: Executor, health_log: SharedHealthLog, service: ServiceInfo) -> Self {
        Self {
            executor,
            health_log,
            service: Arc::new(service),
        }
    }

    /// Builds the registry with the built-in jobs, an in-memory result
    /// store and a worker pool sized from the Config.
    pub fn from_config(config: &Config) -> Result<(Self, WorkerPool)> {
        let health_log = HealthLog::shared(config.log_max_entries);

        let mut registry = Registry::new();
        jobs::register_builtin(&mut registry, config, Arc::clone(&health_log))?;

        let (executor, pool) = Executor::start(
            Arc::new(registry),
            Arc::new(InMemoryResultStore::new()),
            config.worker_count,
            config.job_timeout(),
        );

        let state = Self::new(executor, health_log, ServiceInfo::from_config(config));
        Ok((state, pool))
    }
}

/// Handler for GET /health
///
/// Liveness: answers as long as the process is serving requests.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.service.name.clone(),
        state.service.version.clone(),
    ))
}

/// Handler for GET /health/detailed
///
/// Checks the dependency and reports task and health-log statistics.
/// Responds 503 when the dependency is not usable.
pub async fn detailed_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let dependency = state.service.check_dependency().await;
    let healthy = dependency.is_ready();

    let mut checks = BTreeMap::new();
    checks.insert("dependency".to_string(), dependency.label().to_string());
    checks.insert("application".to_string(), "running".to_string());

    let tasks = state.executor.store().counts().await;
    let health_log = state.health_log.read().await.summary();

    let body = DetailedHealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: state.service.name.clone(),
        version: state.service.version.clone(),
        environment: state.service.environment.clone(),
        checks,
        tasks,
        jobs: state.executor.registry().names(),
        health_log,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// Handler for GET /health/ready
///
/// Readiness: 200 when the dependency is reachable (or none is configured), else 503.
pub async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let dependency = state.service.check_dependency().await;
    let ready = dependency.is_ready();

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadinessResponse::new(ready, state.service.name.clone(), dependency.label());
    (status, Json(body))
}

/// Handler for POST /health/task/trigger
pub async fn trigger_health_task_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TaskSubmittedResponse>)> {
    submit(&state, jobs::HEALTH_PROBE).await
}

/// Handler for POST /health/task/test
pub async fn trigger_test_task_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TaskSubmittedResponse>)> {
    submit(&state, jobs::TEST_TASK).await
}

/// Handler for POST /tasks/:name
///
/// Submits any registered job; 404 for unknown names.
pub async fn submit_task_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<TaskSubmittedResponse>)> {
    submit(&state, &name).await
}

/// Handler for GET /health/task/status/:task_id
pub async fn task_status_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>> {
    let status = state.executor.get_task_status(&task_id).await?;
    Ok(Json(status.into()))
}

async fn submit(state: &AppState, name: &str) -> Result<(StatusCode, Json<TaskSubmittedResponse>)> {
    let task_id = state.executor.submit_task(name).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TaskSubmittedResponse::queued(name, task_id)),
    ))
}
