//! Scheduler Module
//!
//! Submits every periodic job once its interval has elapsed since the last
//! enqueue, and remembers when that was across restarts.
//!
//! A job whose interval ran out while the process was down fires once on the
//! first tick after startup; missed runs are not replayed. Firing is
//! best-effort: a crash between submitting and persisting `last_run_at` can
//! cause one extra run after restart.

mod clock;
mod state;

#[cfg(test)]
mod property_tests;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub use clock::{Clock, ManualClock, SystemClock};
pub use state::{FileScheduleStore, MemoryScheduleStore, ScheduleStore};

use crate::executor::Executor;
use crate::registry::{Interval, Registry};
use crate::store::TaskId;

// == Scheduler ==
pub struct Scheduler {
    /// Periodic jobs sorted by name
    jobs: Vec<(String, Interval)>,
    executor: Executor,
    state: Arc<dyn ScheduleStore>,
    last_runs: HashMap<String, DateTime<Utc>>,
}

impl Scheduler {
    /// Builds a scheduler over the periodic jobs in `registry`, resuming from
    /// whatever `state` has persisted.
    pub async fn new(
        registry: &Registry,
        executor: Executor,
        state: Arc<dyn ScheduleStore>,
    ) -> Self {
        let mut jobs: Vec<(String, Interval)> = registry
            .periodic()
            .filter_map(|def| def.schedule.map(|s| (def.name.clone(), s)))
            .collect();
        jobs.sort_by(|a, b| a.0.cmp(&b.0));

        let last_runs = match state.load_all().await {
            Ok(runs) => runs,
            Err(e) => {
                warn!("Could not load schedule state, starting fresh: {}", e);
                HashMap::new()
            }
        };

        for (name, interval) in &jobs {
            match last_runs.get(name) {
                Some(at) => info!("Scheduled {} {} (last run {})", name, interval, at),
                None => info!("Scheduled {} {} (never run)", name, interval),
            }
        }

        Self {
            jobs,
            executor,
            state,
            last_runs,
        }
    }

    // == Is Due ==
    /// A job is due when it never ran or at least one full interval has passed.
    pub fn is_due(interval: &Interval, last_run_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_run_at {
            None => true,
            Some(last) => now.signed_duration_since(last) >= interval.chrono_duration(),
        }
    }

    // == Tick ==
    /// Submits every job that is due at `now`. Returns the ids of the tasks queued.
    ///
    /// A failed submission is logged and still counts as a run, so a broken
    /// job keeps its cadence instead of retrying on every tick.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Vec<TaskId> {
        let mut submitted = Vec::new();

        for (name, interval) in &self.jobs {
            if !Self::is_due(interval, self.last_runs.get(name).copied(), now) {
                continue;
            }

            match self.executor.submit_task(name).await {
                Ok(id) => {
                    info!(task_id = %id, "Scheduler submitted {}", name);
                    submitted.push(id);
                }
                Err(e) => error!("Scheduler could not submit {}: {}", name, e),
            }

            self.last_runs.insert(name.clone(), now);
            if let Err(e) = self.state.save(name, now).await {
                warn!("Could not persist last run of {}: {}", name, e);
            }
        }

        submitted
    }

    pub fn last_run_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.last_runs.get(name).copied()
    }

    /// Polling period: `max_tick`, tightened to the shortest job interval.
    pub fn poll_interval(&self, max_tick: Duration) -> Duration {
        self.jobs
            .iter()
            .map(|(_, interval)| interval.duration())
            .fold(max_tick, Duration::min)
            .max(Duration::from_millis(1))
    }

    // == Spawn ==
    /// Runs the tick loop on a background task until aborted.
    pub fn spawn(mut self, clock: Arc<dyn Clock>, max_tick: Duration) -> JoinHandle<()> {
        let period = self.poll_interval(max_tick);

        tokio::spawn(async move {
            info!("Starting scheduler with a tick of {:?}", period);

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let submitted = self.tick(clock.now()).await;
                if !submitted.is_empty() {
                    debug!("Scheduler tick queued {} task(s)", submitted.len());
                }
            }
        })
    }
}
