//! Store Module
//!
//! Task records and the result store that tracks them.

mod record;
mod result_store;

#[cfg(test)]
mod property_tests;

pub use record::{TaskId, TaskRecord, TaskState, Transition};
pub use result_store::{InMemoryResultStore, ResultStore, TaskCounts};
