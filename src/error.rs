//! Error types reported by polled tasks.
//!
//! [`TaskError`] is the value carried by the `error` channel. The poller never
//! returns it to the caller of [`Poller::start`](crate::Poller::start); all
//! failure information flows through the notifier.
//!
//! Helper methods (`as_label`, `as_message`) are meant for logs/metrics.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by a single task attempt.
///
/// Only [`TaskError::Fail`] and [`TaskError::Panicked`] are published on the
/// `error` channel. [`TaskError::Canceled`] is treated as a graceful exit.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The attempt failed; the poller schedules another one after the delay.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task body panicked. Caught by the poller and reported like a failure.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text (or `"unknown"`).
        info: String,
    },

    /// The task observed its abort signal and gave up.
    #[error("task cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use taskpoll::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpoll::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "task cancelled".to_string(),
        }
    }

    /// Whether this error should be published on the `error` channel.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, TaskError::Canceled)
    }

    /// Builds a [`TaskError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown".to_string()
        };
        TaskError::Panicked { info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { info: "x".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn test_canceled_is_not_reportable() {
        assert!(TaskError::fail("boom").is_reportable());
        assert!(!TaskError::Canceled.is_reportable());
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = TaskError::from_panic(Box::new("static str"));
        assert_eq!(err, TaskError::Panicked { info: "static str".into() });

        let err = TaskError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.as_message(), "panic: owned");

        let err = TaskError::from_panic(Box::new(42_u8));
        assert_eq!(err, TaskError::Panicked { info: "unknown".into() });
    }
}
