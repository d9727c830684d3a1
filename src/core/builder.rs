use std::time::Duration;

use crate::{core::config::PollerConfig, tasks::TaskRef};

use super::poller::Poller;

/// Builder for constructing a [`Poller`] with non-default timing.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskpoll::{Poller, TaskContext, TaskError, TaskFn, TaskRef};
///
/// let task: TaskRef<()> =
///     TaskFn::arc("probe", |_ctx: TaskContext<()>| async { Ok::<_, TaskError>(()) });
/// let poller = Poller::builder(task)
///     .delay(Duration::from_millis(500))
///     .timeout(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(poller.config().timeout_secs(), 10);
/// ```
pub struct PollerBuilder<P> {
    task: TaskRef<P>,
    config: PollerConfig,
}

impl<P: Send + 'static> PollerBuilder<P> {
    /// Creates a new builder with [`PollerConfig::default`].
    pub fn new(task: TaskRef<P>) -> Self {
        Self {
            task,
            config: PollerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the wait between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Sets the run timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Builds an inactive poller.
    pub fn build(self) -> Poller<P> {
        Poller::new(self.task, self.config)
    }
}
