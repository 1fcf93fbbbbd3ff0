//! API Routes
//!
//! Configures the Axum router with all health and task endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    detailed_handler, health_handler, ready_handler, submit_task_handler, task_status_handler,
    trigger_health_task_handler, trigger_test_task_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness
/// - `GET /health/detailed` - Dependency, task and log statistics
/// - `GET /health/ready` - Readiness probe
/// - `POST /health/task/trigger` - Queue a health probe
/// - `POST /health/task/test` - Queue the test task
/// - `POST /tasks/:name` - Queue any registered job
/// - `GET /health/task/status/:task_id` - Task status
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/detailed", get(detailed_handler))
        .route("/health/ready", get(ready_handler))
        .route("/health/task/trigger", post(trigger_health_task_handler))
        .route("/health/task/test", post(trigger_test_task_handler))
        .route("/health/task/status/:task_id", get(task_status_handler))
        .route("/tasks/:name", post(submit_task_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
