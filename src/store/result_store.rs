//! Result Store Module
//!
//! Task id -> TaskRecord tracking with atomic, forward-only transitions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{Result, TaskError};
use crate::store::{TaskId, TaskRecord, TaskState, Transition};

// == Task Counts ==
/// Number of records per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub started: usize,
    pub success: usize,
    pub failure: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.pending + self.started + self.success + self.failure
    }

    fn record(&mut self, state: TaskState) {
        match state {
            TaskState::Pending => self.pending += 1,
            TaskState::Started => self.started += 1,
            TaskState::Success => self.success += 1,
            TaskState::Failure => self.failure += 1,
        }
    }
}

// == Result Store Trait ==
/// Storage for task records.
///
/// Implementations must make each transition atomic with respect to `get`.
/// An implementation backed by a shared external store lets submitters and
/// pollers live in different processes.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Inserts a new record; fails if the id is already taken.
    async fn put(&self, record: TaskRecord) -> Result<()>;

    /// Current snapshot of a record.
    async fn get(&self, id: &TaskId) -> Result<TaskRecord>;

    /// Applies a forward transition and returns the new record.
    async fn transition(&self, id: &TaskId, transition: Transition) -> Result<TaskRecord>;

    /// Totals per state.
    async fn counts(&self) -> TaskCounts;
}

// == In-Memory Store ==
/// Process-local result store.
///
/// The map lock is held only to find or insert a slot; each record has its
/// own lock, so a transition on one task never blocks readers of another.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<TaskId, Arc<RwLock<TaskRecord>>>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: &TaskId) -> Result<Arc<RwLock<TaskRecord>>> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(format!("task '{id}'")))
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn put(&self, record: TaskRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(record.id()) {
            return Err(TaskError::DuplicateTask(record.id().to_string()));
        }
        records.insert(record.id().clone(), Arc::new(RwLock::new(record)));
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> Result<TaskRecord> {
        let slot = self.slot(id).await?;
        let record = slot.read().await;
        Ok(record.clone())
    }

    async fn transition(&self, id: &TaskId, transition: Transition) -> Result<TaskRecord> {
        let slot = self.slot(id).await?;
        let mut current = slot.write().await;

        // Build the whole next record before swapping it in.
        let next = current.apply(transition, Utc::now())?;
        *current = next.clone();
        Ok(next)
    }

    async fn counts(&self) -> TaskCounts {
        let slots: Vec<_> = self.records.read().await.values().cloned().collect();
        let mut counts = TaskCounts::default();
        for slot in slots {
            counts.record(slot.read().await.state());
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn record(id: &str) -> TaskRecord {
        TaskRecord::pending(TaskId::from(id), "ping", Utc::now())
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryResultStore::new();
        store.put(record("abc")).await.unwrap();

        let fetched = store.get(&TaskId::from("abc")).await.unwrap();
        assert_eq!(fetched.state(), TaskState::Pending);
        assert_eq!(fetched.name(), "ping");
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let store = InMemoryResultStore::new();
        let result = store.get(&TaskId::from("never-submitted")).await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_rejects_existing_id() {
        let store = InMemoryResultStore::new();
        store.put(record("abc")).await.unwrap();

        let result = store.put(record("abc")).await;
        assert!(matches!(result, Err(TaskError::DuplicateTask(ref id)) if id == "abc"));
    }

    #[tokio::test]
    async fn test_locked_record_does_not_block_others() {
        let store = InMemoryResultStore::new();
        store.put(record("a")).await.unwrap();
        store.put(record("b")).await.unwrap();

        // Hold record a exactly as a transition in progress would.
        let slot_a = store.slot(&TaskId::from("a")).await.unwrap();
        let _writing = slot_a.write().await;

        let read_b =
            tokio::time::timeout(Duration::from_secs(1), store.get(&TaskId::from("b"))).await;
        assert_eq!(read_b.unwrap().unwrap().state(), TaskState::Pending);

        let transition_b = tokio::time::timeout(
            Duration::from_secs(1),
            store.transition(&TaskId::from("b"), Transition::Start),
        )
        .await;
        assert_eq!(transition_b.unwrap().unwrap().state(), TaskState::Started);

        let read_a =
            tokio::time::timeout(Duration::from_millis(50), store.get(&TaskId::from("a"))).await;
        assert!(read_a.is_err());
    }

    #[tokio::test]
    async fn test_transition_sequence() {
        let store = InMemoryResultStore::new();
        let id = TaskId::from("abc");
        store.put(record("abc")).await.unwrap();

        store.transition(&id, Transition::Start).await.unwrap();
        let done = store
            .transition(&id, Transition::Succeed(json!({"ok": true})))
            .await
            .unwrap();
        assert_eq!(done.state(), TaskState::Success);

        // Repeated reads are stable
        for _ in 0..3 {
            let fetched = store.get(&id).await.unwrap();
            assert_eq!(fetched.result(), Some(&json!({"ok": true})));
        }
    }

    #[tokio::test]
    async fn test_rejected_transition_leaves_record_unchanged() {
        let store = InMemoryResultStore::new();
        let id = TaskId::from("abc");
        store.put(record("abc")).await.unwrap();

        let result = store.transition(&id, Transition::Fail("x".into())).await;
        assert!(matches!(result, Err(TaskError::InvalidTransition { .. })));
        assert_eq!(store.get(&id).await.unwrap().state(), TaskState::Pending);
    }

    #[tokio::test]
    async fn test_transition_unknown_id() {
        let store = InMemoryResultStore::new();
        let result = store
            .transition(&TaskId::from("ghost"), Transition::Start)
            .await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_consistent_records() {
        let store = Arc::new(InMemoryResultStore::new());
        let id = TaskId::from("abc");
        store.put(record("abc")).await.unwrap();

        let reader = {
            let store = Arc::clone(&store);
            let id = id.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let r = store.get(&id).await.unwrap();
                    assert_eq!(r.result().is_some(), r.state() == TaskState::Success);
                    assert_eq!(r.error().is_some(), r.state() == TaskState::Failure);
                    tokio::task::yield_now().await;
                }
            })
        };

        store.transition(&id, Transition::Start).await.unwrap();
        store
            .transition(&id, Transition::Succeed(json!(42)))
            .await
            .unwrap();
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_counts() {
        let store = InMemoryResultStore::new();
        store.put(record("a")).await.unwrap();
        store.put(record("b")).await.unwrap();
        store
            .transition(&TaskId::from("b"), Transition::Start)
            .await
            .unwrap();

        let counts = store.counts().await;
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.started, 1);
        assert_eq!(counts.total(), 2);
    }
}
