//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing async cancelable polling attempts
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<P>>`)
//! - [`TaskContext`] - per-attempt `done` callback and [`AbortSignal`]

mod context;
mod task;
mod task_fn;

pub use context::{AbortSignal, Done, TaskContext};
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
