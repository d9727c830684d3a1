//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cooperatively cancelable) polled
//! by the [`Poller`](crate::Poller). The common handle type is [`TaskRef`], an
//! `Arc<dyn Task<P>>` suitable for sharing across attempts.
//!
//! A task receives a [`TaskContext`] per attempt. It should call
//! [`TaskContext::done`] once the awaited condition holds, return `Ok(())`
//! without calling it to be retried after the delay, or return an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::context::TaskContext;

/// Shared handle to a polled task.
pub type TaskRef<P> = Arc<dyn Task<P>>;

/// # Asynchronous, cancelable polling attempt.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method invoked once per attempt.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskpoll::{Task, TaskContext, TaskError};
///
/// struct StatusCheck;
///
/// #[async_trait]
/// impl Task<String> for StatusCheck {
///     fn name(&self) -> &str { "status-check" }
///
///     async fn run(&self, ctx: TaskContext<String>) -> Result<(), TaskError> {
///         if ctx.signal().is_aborted() {
///             return Err(TaskError::Canceled);
///         }
///         ctx.done("active".to_string());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task<P>: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes one attempt.
    ///
    /// Implementations should watch `ctx.signal()` and give up promptly once the
    /// run is closed; the poller tolerates tasks that ignore it.
    async fn run(&self, ctx: TaskContext<P>) -> Result<(), TaskError>;
}
