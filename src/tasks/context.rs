//! # Per-attempt context handed to a task.
//!
//! [`TaskContext`] bundles the two things a task may touch:
//! - [`Done`] — reports successful completion with a payload;
//! - [`AbortSignal`] — read-only view of the run's cancellation token.
//!
//! Both are cheap to clone and may be moved into spawned sub-futures.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Read-only view of a run's cancellation token.
///
/// The poller creates a fresh token on every `start()` and cancels it exactly
/// once, on `close()`. Tasks can observe it but never cancel it.
#[derive(Clone, Debug)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// True once the run this attempt belongs to has been closed.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the run is closed. Use in `select!` to drop in-flight work.
    pub fn aborted(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Owned variant of [`AbortSignal::aborted`], for moving into spawned futures.
    pub async fn aborted_owned(self) {
        self.token.cancelled_owned().await
    }
}

/// Completion callback for one attempt.
///
/// Calling it after the poller has closed (or after the run was superseded by a
/// restart) is a silent no-op.
pub struct Done<P> {
    complete: Arc<dyn Fn(P) + Send + Sync>,
}

impl<P> Clone for Done<P> {
    fn clone(&self) -> Self {
        Self {
            complete: Arc::clone(&self.complete),
        }
    }
}

impl<P> fmt::Debug for Done<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Done")
    }
}

impl<P> Done<P> {
    pub(crate) fn new(complete: impl Fn(P) + Send + Sync + 'static) -> Self {
        Self {
            complete: Arc::new(complete),
        }
    }

    /// Reports completion with `payload`.
    pub fn send(&self, payload: P) {
        (self.complete)(payload)
    }
}

/// Everything a task attempt receives from the poller.
///
/// ## Example
/// ```rust
/// use taskpoll::{TaskContext, TaskError};
///
/// async fn check(ctx: TaskContext<String>) -> Result<(), TaskError> {
///     if ctx.signal().is_aborted() {
///         return Err(TaskError::Canceled);
///     }
///     let status = String::from("active"); // e.g. an HTTP status lookup
///     if status == "active" {
///         ctx.done(status);
///     }
///     Ok(())
/// }
/// ```
pub struct TaskContext<P> {
    done: Done<P>,
    signal: AbortSignal,
}

impl<P> Clone for TaskContext<P> {
    fn clone(&self) -> Self {
        Self {
            done: self.done.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<P> fmt::Debug for TaskContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("aborted", &self.signal.is_aborted())
            .finish()
    }
}

impl<P> TaskContext<P> {
    pub(crate) fn new(done: Done<P>, signal: AbortSignal) -> Self {
        Self { done, signal }
    }

    /// Reports successful completion. See [`Done::send`].
    #[inline]
    pub fn done(&self, payload: P) {
        self.done.send(payload)
    }

    /// Completion handle, for moving into sub-futures.
    #[inline]
    pub fn done_handle(&self) -> Done<P> {
        self.done.clone()
    }

    /// Cancellation signal of the current run.
    #[inline]
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_signal_reflects_token() {
        let token = CancellationToken::new();
        let signal = AbortSignal::new(token.clone());
        assert!(!signal.is_aborted());
        token.cancel();
        assert!(signal.is_aborted());
    }

    #[test]
    fn test_done_forwards_payload() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let ctx = TaskContext::new(
            Done::new(move |p: &'static str| s.lock().push(p)),
            AbortSignal::new(CancellationToken::new()),
        );
        ctx.done("active");
        ctx.done_handle().send("again");
        assert_eq!(*seen.lock(), vec!["active", "again"]);
    }

    #[tokio::test]
    async fn test_aborted_resolves_after_cancel() {
        let token = CancellationToken::new();
        let signal = AbortSignal::new(token.clone());
        let waiter = tokio::spawn(signal.clone().aborted_owned());
        token.cancel();
        waiter.await.unwrap();
        signal.aborted().await;
    }
}
