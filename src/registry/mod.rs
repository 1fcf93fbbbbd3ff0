//! Registry Module
//!
//! Maps job names to units of work and their periodic schedules.
//!
//! Built once at startup and shared read-only behind an `Arc`.

mod interval;
mod job;

use std::collections::HashMap;

pub use interval::{Interval, IntervalUnit};
pub use job::{job_fn, FnJob, Job, JobContext, JobDefinition};

use crate::error::{Result, TaskError};

// == Registry ==
/// Name-keyed table of job definitions.
#[derive(Debug, Default)]
pub struct Registry {
    jobs: HashMap<String, JobDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds a definition; a name can only be registered once.
    pub fn register(&mut self, definition: JobDefinition) -> Result<()> {
        if self.jobs.contains_key(&definition.name) {
            return Err(TaskError::DuplicateName(definition.name));
        }
        self.jobs.insert(definition.name.clone(), definition);
        Ok(())
    }

    // == Lookup ==
    pub fn lookup(&self, name: &str) -> Result<&JobDefinition> {
        self.jobs
            .get(name)
            .ok_or_else(|| TaskError::NotFound(format!("job '{name}'")))
    }

    /// Definitions that carry a schedule.
    pub fn periodic(&self) -> impl Iterator<Item = &JobDefinition> {
        self.jobs.values().filter(|d| d.schedule.is_some())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
