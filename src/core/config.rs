//! # Poller timing configuration.
//!
//! Provides [`PollerConfig`], the two durations that drive a polling run.
//!
//! ## Sentinel values
//! - Zero durations are clamped to 1 ms by the accessors (a zero delay would spin,
//!   a zero timeout would close before the first attempt could settle).

use std::time::Duration;

/// Timing configuration for a [`Poller`](crate::Poller).
///
/// ## Field semantics
/// - `delay`: wait between the end of one attempt and the start of the next
/// - `timeout`: maximum wall-clock length of a run, measured from `start()`
///
/// The two are independent: a `delay` longer than `timeout` is legal and simply
/// means the timeout fires before any re-invocation happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    /// Wait between attempts (fixed, no backoff).
    pub delay: Duration,

    /// Maximum run duration before `timeout` + `close` are published.
    pub timeout: Duration,
}

impl PollerConfig {
    /// Default wait between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);
    /// Default run timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

    const MIN: Duration = Duration::from_millis(1);

    /// Creates a configuration from explicit durations.
    pub fn new(delay: Duration, timeout: Duration) -> Self {
        Self { delay, timeout }
    }

    /// Creates a configuration from millisecond values.
    ///
    /// # Example
    /// ```
    /// use taskpoll::PollerConfig;
    ///
    /// let cfg = PollerConfig::from_millis(1000, 5000);
    /// assert_eq!(cfg.timeout_secs(), 5);
    /// ```
    pub fn from_millis(delay_ms: u64, timeout_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(delay_ms),
            Duration::from_millis(timeout_ms),
        )
    }

    /// Returns the delay clamped to a minimum of 1 ms.
    #[inline]
    pub fn delay_clamped(&self) -> Duration {
        self.delay.max(Self::MIN)
    }

    /// Returns the timeout clamped to a minimum of 1 ms.
    #[inline]
    pub fn timeout_clamped(&self) -> Duration {
        self.timeout.max(Self::MIN)
    }

    /// Whole seconds in the timeout; the `remaining` value of the `start` event.
    #[inline]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_clamped().as_secs()
    }
}

impl Default for PollerConfig {
    /// Default configuration:
    ///
    /// - `delay = 3000ms`
    /// - `timeout = 30000ms`
    fn default() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
