//! Property-Based Tests for Task Records
//!
//! Uses proptest to check the record lifecycle against arbitrary transition sequences.

use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;

use crate::store::{TaskId, TaskRecord, TaskState, Transition};

// == Strategies ==
fn transition_strategy() -> impl Strategy<Value = Transition> {
    prop_oneof![
        Just(Transition::Start),
        any::<i64>().prop_map(|n| Transition::Succeed(json!(n))),
        "[a-z ]{1,32}".prop_map(Transition::Fail),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // State never moves backward, whatever sequence of transitions is attempted,
    // and rejected transitions leave the record untouched.
    #[test]
    fn prop_state_is_monotonic(ops in prop::collection::vec(transition_strategy(), 1..20)) {
        let mut record = TaskRecord::pending(TaskId::generate(), "job", Utc::now());

        for op in ops {
            let before = record.clone();
            match record.apply(op, Utc::now()) {
                Ok(next) => {
                    prop_assert!(next.state() > before.state(), "state went backward");
                    record = next;
                }
                Err(_) => prop_assert_eq!(&record, &before),
            }
        }
    }

    // result is present iff SUCCESS, error iff FAILURE.
    #[test]
    fn prop_payload_matches_state(ops in prop::collection::vec(transition_strategy(), 1..20)) {
        let mut record = TaskRecord::pending(TaskId::generate(), "job", Utc::now());

        for op in ops {
            if let Ok(next) = record.apply(op, Utc::now()) {
                record = next;
            }
            prop_assert_eq!(record.result().is_some(), record.state() == TaskState::Success);
            prop_assert_eq!(record.error().is_some(), record.state() == TaskState::Failure);
            prop_assert_eq!(record.completed_at().is_some(), record.state().is_terminal());
        }
    }
}
