//! API Module
//!
//! HTTP handlers and routing for the health and task endpoints.
//!
//! # Endpoints
//! - `GET /health` - Liveness
//! - `GET /health/detailed` - Detailed health
//! - `GET /health/ready` - Readiness
//! - `POST /health/task/trigger` - Queue a health probe
//! - `POST /health/task/test` - Queue the test task
//! - `POST /tasks/:name` - Queue a job by name
//! - `GET /health/task/status/:task_id` - Poll a task

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
