//! # LogWriter — simple event logger
//!
//! A minimal observer that logs every lifecycle [`Event`] of a poller through
//! `tracing`. Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO taskpoll: [start] task="status" passed=0 remaining=30
//! INFO taskpoll: [second] task="status" passed=1 remaining=29
//! INFO taskpoll: [error] task="status" err="execution failed: 503"
//! INFO taskpoll: [success] task="status"
//! INFO taskpoll: [close] task="status"
//! ```

use std::sync::Arc;

use crate::core::Poller;
use crate::events::{Event, EventKind, Subscription};

/// Event writer observer.
#[derive(Debug, Clone)]
pub struct LogWriter {
    task: Arc<str>,
}

impl LogWriter {
    /// Construct a writer that tags every line with `task`.
    #[must_use]
    pub fn new(task: impl Into<Arc<str>>) -> Self {
        Self { task: task.into() }
    }

    /// Subscribes a writer to every channel of `poller`.
    ///
    /// The returned subscriptions detach it again.
    pub fn attach<P: Send + 'static>(poller: &Poller<P>) -> Vec<Subscription> {
        let writer = Self::new(poller.task_name().to_string());
        EventKind::ALL
            .into_iter()
            .map(|kind| {
                let w = writer.clone();
                poller.subscribe(kind, move |ev| w.write(ev))
            })
            .collect()
    }

    /// Logs a single event.
    pub fn write<P>(&self, e: &Event<P>) {
        let task = &*self.task;
        match e {
            Event::Start(t) => {
                tracing::info!(
                    "[start] task={task:?} passed={} remaining={}",
                    t.passed,
                    t.remaining
                );
            }
            Event::Second(t) => {
                tracing::info!(
                    "[second] task={task:?} passed={} remaining={}",
                    t.passed,
                    t.remaining
                );
            }
            Event::Success(_) => {
                tracing::info!("[success] task={task:?}");
            }
            Event::Error(err) => {
                tracing::info!(
                    "[error] task={task:?} err={:?} label={}",
                    err.to_string(),
                    err.as_label()
                );
            }
            Event::Timeout => {
                tracing::info!("[timeout] task={task:?}");
            }
            Event::Close => {
                tracing::info!("[close] task={task:?}");
            }
        }
    }
}
