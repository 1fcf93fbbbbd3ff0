//! Health Log Entry Module
//!
//! One recorded dependency check.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Health Log Entry ==
/// Outcome of a single health check, as kept in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthLogEntry {
    /// When the check ran
    pub recorded_at: DateTime<Utc>,
    /// Name of the check (e.g. "dependency")
    pub check: String,
    /// Status label such as "healthy", "unhealthy", "timeout"
    pub status: String,
    /// Whether the check counts as an error
    pub healthy: bool,
    /// Free-form detail, usually the error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthLogEntry {
    pub fn new(
        check: impl Into<String>,
        status: impl Into<String>,
        healthy: bool,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            recorded_at,
            check: check.into(),
            status: status.into(),
            healthy,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // == Is Stale ==
    /// An entry is stale once it was recorded strictly before `cutoff`.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.recorded_at < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entry_staleness_boundary() {
        let now = Utc::now();
        let entry = HealthLogEntry::new("dependency", "healthy", true, now);
        assert!(!entry.is_stale(now));
        assert!(entry.is_stale(now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_entry_detail_serialization() {
        let entry = HealthLogEntry::new("dependency", "unhealthy", false, Utc::now())
            .with_detail("connection refused");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("connection refused"));

        let plain = HealthLogEntry::new("dependency", "healthy", true, Utc::now());
        assert!(!serde_json::to_string(&plain).unwrap().contains("detail"));
    }
}
