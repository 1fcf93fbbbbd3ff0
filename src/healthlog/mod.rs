//! Health Log Module
//!
//! Bounded, time-ordered record of health checks. Written by the probe job,
//! pruned by the cleanup job and summarised by the report job.
//!
//! This store is separate from task records.

mod entry;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

pub use entry::HealthLogEntry;

/// Shared handle used by jobs and handlers.
pub type SharedHealthLog = Arc<RwLock<HealthLog>>;

// == Health Summary ==
/// Aggregate view over the entries currently held.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthSummary {
    pub checks_performed: usize,
    pub errors: usize,
    pub last_status: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

// == Health Log ==
#[derive(Debug)]
pub struct HealthLog {
    /// Oldest first
    entries: VecDeque<HealthLogEntry>,
    max_entries: usize,
    /// Entries dropped for capacity since startup
    dropped: u64,
}

impl HealthLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
            dropped: 0,
        }
    }

    pub fn shared(max_entries: usize) -> SharedHealthLog {
        Arc::new(RwLock::new(Self::new(max_entries)))
    }

    // == Record ==
    /// Appends an entry, dropping the oldest once at capacity.
    pub fn record(&mut self, entry: HealthLogEntry) {
        while self.entries.len() >= self.max_entries {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }

    // == Prune ==
    /// Removes every entry recorded before `cutoff`. Returns how many were removed.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is_stale(cutoff));
        before - self.entries.len()
    }

    // == Summary ==
    pub fn summary(&self) -> HealthSummary {
        let last = self.entries.back();
        HealthSummary {
            checks_performed: self.entries.len(),
            errors: self.entries.iter().filter(|e| !e.healthy).count(),
            last_status: last.map(|e| e.status.clone()),
            last_checked_at: last.map(|e| e.recorded_at),
        }
    }

    /// Most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HealthLogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
