//! Property-Based Tests for the Scheduler
//!
//! Drives the scheduler with a simulated clock and arbitrary polling patterns.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use crate::executor::Executor;
use crate::registry::{job_fn, Interval, IntervalUnit, JobDefinition, Registry};
use crate::scheduler::{MemoryScheduleStore, Scheduler};
use crate::store::InMemoryResultStore;

const INTERVAL_SECS: i64 = 300;

// == Strategies ==
/// Gaps between consecutive ticks, in seconds. Mostly rapid polling with the
/// occasional long pause.
fn tick_gaps_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(prop_oneof![4 => 0i64..30, 1 => 30i64..2_000], 1..120)
}

/// Every tick time, paired with whether that tick submitted the job.
fn run_ticks(gaps: &[i64]) -> Vec<(DateTime<Utc>, bool)> {
    tokio_test::block_on(async {
        let mut registry = Registry::new();
        registry
            .register(JobDefinition::periodic(
                "health_probe",
                job_fn(|_| async { Ok(json!(null)) }),
                Interval::new(5, IntervalUnit::Minutes).unwrap(),
            ))
            .unwrap();
        let registry = Arc::new(registry);

        let (executor, _pool) = Executor::start(
            Arc::clone(&registry),
            Arc::new(InMemoryResultStore::new()),
            1,
            std::time::Duration::from_secs(1),
        );
        let mut scheduler =
            Scheduler::new(&registry, executor, Arc::new(MemoryScheduleStore::new())).await;

        let mut now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ticks = Vec::new();
        for gap in gaps {
            now += Duration::seconds(*gap);
            let fired = !scheduler.tick(now).await.is_empty();
            ticks.push((now, fired));
        }
        ticks
    })
}

fn fires(ticks: &[(DateTime<Utc>, bool)]) -> Vec<DateTime<Utc>> {
    ticks.iter().filter(|(_, fired)| *fired).map(|(at, _)| *at).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // The very first tick fires a job that has never run.
    #[test]
    fn prop_first_tick_fires(gaps in tick_gaps_strategy()) {
        let ticks = run_ticks(&gaps);
        prop_assert!(ticks[0].1);
    }

    // Never more than once per interval, however fast the polling.
    #[test]
    fn prop_at_most_once_per_interval(gaps in tick_gaps_strategy()) {
        let fired = fires(&run_ticks(&gaps));
        for pair in fired.windows(2) {
            prop_assert!(
                pair[1] - pair[0] >= Duration::seconds(INTERVAL_SECS),
                "fired at {} and again at {}", pair[0], pair[1]
            );
        }
    }

    // Fires on the first tick at or after each deadline; no tick past a
    // deadline goes by without a submission.
    #[test]
    fn prop_no_missed_deadline(gaps in tick_gaps_strategy()) {
        let mut last: Option<DateTime<Utc>> = None;
        for (tick, fired) in run_ticks(&gaps) {
            let due = match last {
                None => true,
                Some(l) => tick - l >= Duration::seconds(INTERVAL_SECS),
            };
            prop_assert_eq!(due, fired, "tick {}", tick);
            if due {
                last = Some(tick);
            }
        }
    }
}
