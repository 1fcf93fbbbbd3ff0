//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Number of worker tasks executing submitted jobs
    pub worker_count: usize,
    /// Upper bound on a single job run, in seconds
    pub job_timeout: u64,
    /// Scheduler polling granularity in seconds
    pub scheduler_tick: u64,
    /// File holding the persisted `last_run_at` per periodic job
    pub schedule_state_path: PathBuf,
    /// `host:port` of the dependency the health probe connects to
    pub probe_target: Option<String>,
    /// Dependency connect timeout in seconds
    pub probe_timeout: u64,
    /// Health log retention in seconds
    pub log_retention: u64,
    /// Maximum number of health log entries kept
    pub log_max_entries: usize,
    /// Service name reported in payloads
    pub service_name: String,
    /// Service version reported in payloads
    pub service_version: String,
    /// Deployment environment label
    pub environment: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `WORKER_COUNT` - Worker pool size, at least 1 (default: 4)
    /// - `JOB_TIMEOUT_SECS` - Per-run timeout (default: 30)
    /// - `SCHEDULER_TICK_SECS` - Scheduler polling interval (default: 1)
    /// - `SCHEDULE_STATE_PATH` - Schedule state file (default: schedule_state.json)
    /// - `PROBE_TARGET` - Dependency address to probe (default: unset)
    /// - `PROBE_TIMEOUT_SECS` - Probe connect timeout (default: 5)
    /// - `LOG_RETENTION_SECS` - Health log retention (default: 86400)
    /// - `LOG_MAX_ENTRIES` - Health log capacity (default: 10000)
    /// - `SERVICE_NAME`, `SERVICE_VERSION`, `ENVIRONMENT` - reported metadata
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable source; `from_env` passes the process environment.
    ///
    /// Worker count, job timeout and scheduler tick are clamped to at least 1.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            worker_count: parse_var(&lookup, "WORKER_COUNT")
                .unwrap_or(defaults.worker_count)
                .max(1),
            job_timeout: parse_var(&lookup, "JOB_TIMEOUT_SECS")
                .unwrap_or(defaults.job_timeout)
                .max(1),
            scheduler_tick: parse_var(&lookup, "SCHEDULER_TICK_SECS")
                .unwrap_or(defaults.scheduler_tick)
                .max(1),
            schedule_state_path: lookup("SCHEDULE_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.schedule_state_path),
            probe_target: lookup("PROBE_TARGET").filter(|v| !v.is_empty()),
            probe_timeout: parse_var(&lookup, "PROBE_TIMEOUT_SECS")
                .unwrap_or(defaults.probe_timeout),
            log_retention: parse_var(&lookup, "LOG_RETENTION_SECS")
                .unwrap_or(defaults.log_retention),
            log_max_entries: parse_var(&lookup, "LOG_MAX_ENTRIES")
                .unwrap_or(defaults.log_max_entries),
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: lookup("SERVICE_VERSION").unwrap_or(defaults.service_version),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }

    pub fn log_retention(&self) -> Duration {
        Duration::from_secs(self.log_retention)
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            worker_count: 4,
            job_timeout: 30,
            scheduler_tick: 1,
            schedule_state_path: PathBuf::from("schedule_state.json"),
            probe_target: None,
            probe_timeout: 5,
            log_retention: 86_400,
            log_max_entries: 10_000,
            service_name: "taskbeat".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}
