//! Built-in Jobs Module
//!
//! The maintenance jobs this service ships with and their fixed cadences.
//!
//! | name | cadence |
//! |---|---|
//! | `health_probe` | every 5 minutes |
//! | `log_cleanup` | every 1 hour |
//! | `health_report` | every 24 hours |
//! | `test_task` | on demand |

mod cleanup;
mod diagnostic;
mod probe;
mod report;

use std::sync::Arc;

use chrono::{Duration, Utc};

pub use cleanup::LogCleanupJob;
pub use diagnostic::TestJob;
pub use probe::{
    check_dependency, connect_within, DependencyCheck, DependencyStatus, HealthProbeJob,
    TcpDependency,
};
pub use report::HealthReportJob;

use crate::config::Config;
use crate::error::Result;
use crate::healthlog::SharedHealthLog;
use crate::registry::{Interval, IntervalUnit, JobDefinition, Registry};

// == Job Names ==
pub const HEALTH_PROBE: &str = "health_probe";
pub const LOG_CLEANUP: &str = "log_cleanup";
pub const HEALTH_REPORT: &str = "health_report";
pub const TEST_TASK: &str = "test_task";

/// Registers every built-in job into `registry`.
pub fn register_builtin(
    registry: &mut Registry,
    config: &Config,
    log: SharedHealthLog,
) -> Result<()> {
    let retention = Duration::from_std(config.log_retention()).unwrap_or(Duration::MAX);

    registry.register(JobDefinition::periodic(
        HEALTH_PROBE,
        Arc::new(HealthProbeJob::tcp(
            config.probe_target.clone(),
            config.probe_timeout(),
            Arc::clone(&log),
        )),
        Interval::new(5, IntervalUnit::Minutes)?,
    ))?;

    registry.register(JobDefinition::periodic(
        LOG_CLEANUP,
        Arc::new(LogCleanupJob::new(Arc::clone(&log), retention)),
        Interval::new(1, IntervalUnit::Hours)?,
    ))?;

    registry.register(JobDefinition::periodic(
        HEALTH_REPORT,
        Arc::new(HealthReportJob::new(log, config.service_name.clone(), Utc::now())),
        Interval::new(24, IntervalUnit::Hours)?,
    ))?;

    registry.register(JobDefinition::on_demand(TEST_TASK, Arc::new(TestJob)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::healthlog::HealthLog;

    fn builtin() -> Registry {
        let mut registry = Registry::new();
        register_builtin(&mut registry, &Config::default(), HealthLog::shared(10)).unwrap();
        registry
    }

    #[test]
    fn test_builtin_cadences() {
        let registry = builtin();
        let cadence = |name: &str| {
            registry
                .lookup(name)
                .unwrap()
                .schedule
                .map(|s| s.duration().as_secs())
        };

        assert_eq!(cadence(HEALTH_PROBE), Some(5 * 60));
        assert_eq!(cadence(LOG_CLEANUP), Some(60 * 60));
        assert_eq!(cadence(HEALTH_REPORT), Some(24 * 60 * 60));
        assert_eq!(cadence(TEST_TASK), None);
        assert_eq!(registry.periodic().count(), 3);
    }

    #[test]
    fn test_registering_twice_is_rejected() {
        let mut registry = builtin();
        let result = register_builtin(&mut registry, &Config::default(), HealthLog::shared(10));
        assert!(matches!(result, Err(TaskError::DuplicateName(_))));
    }
}
