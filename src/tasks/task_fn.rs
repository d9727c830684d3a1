//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(TaskContext<P>) -> Fut`, producing a fresh
//! future per attempt. No state is shared between attempts unless the closure
//! captures it explicitly (e.g. behind an `Arc`).
//!
//! ## Example
//! ```rust
//! use taskpoll::{TaskContext, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef<u16> = TaskFn::arc("health", |ctx: TaskContext<u16>| async move {
//!     ctx.done(200);
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "health");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::context::TaskContext;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per attempt. The payload type is
/// taken from the closure's `TaskContext<P>` argument.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> std::fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFn").field("name", &self.name).finish()
    }
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<P, F, Fut> Task<P> for TaskFn<F>
where
    P: Send + 'static,
    F: Fn(TaskContext<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext<P>) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
