//! # Run a single polling attempt.
//!
//! Executes one attempt of a [`Task`] and folds every way it can settle into a
//! `Result`:
//!
//! ```text
//! task.run(ctx) → Ok(())            → Ok(())   (retry after delay, unless done() closed the run)
//!               → Err(Canceled)     → Err(..)  (graceful, never published)
//!               → Err(Fail)         → Err(..)  (published on `error`)
//!               → panic             → Err(Panicked)
//! ```
//!
//! ## Rules
//! - A panic in the task body never unwinds into the poller.
//! - No timeout is applied here: the run-wide timeout is wall-clock and closes
//!   the poller independently of in-flight attempts.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{
    error::TaskError,
    tasks::{Task, TaskContext},
};

/// Executes a single attempt of `task`.
pub(crate) async fn run_once<P, T>(task: &T, ctx: TaskContext<P>) -> Result<(), TaskError>
where
    T: Task<P> + ?Sized,
{
    match AssertUnwindSafe(task.run(ctx)).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(TaskError::from_panic(panic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{AbortSignal, Done, TaskFn};
    use tokio_util::sync::CancellationToken;

    fn ctx() -> TaskContext<()> {
        TaskContext::new(Done::new(|_: ()| {}), AbortSignal::new(CancellationToken::new()))
    }

    #[tokio::test]
    async fn test_ok_passes_through() {
        let t = TaskFn::new("ok", |_ctx: TaskContext<()>| async {
            Ok::<(), TaskError>(())
        });
        assert_eq!(run_once(&t, ctx()).await, Ok(()));
    }

    #[tokio::test]
    async fn test_error_passes_through() {
        let t = TaskFn::new("fail", |_ctx: TaskContext<()>| async {
            Err::<(), TaskError>(TaskError::fail("boom"))
        });
        assert_eq!(run_once(&t, ctx()).await, Err(TaskError::fail("boom")));
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let t = TaskFn::new("panics", |_ctx: TaskContext<()>| async {
            if true {
                panic!("kaboom");
            }
            Ok::<(), TaskError>(())
        });
        assert_eq!(
            run_once(&t, ctx()).await,
            Err(TaskError::Panicked { info: "kaboom".into() })
        );
    }
}
