//! # Poller: fixed-cadence task polling with a run-wide timeout.
//!
//! Invokes one [`Task`] repeatedly until it reports completion through `done`,
//! the run times out, or the poller is closed, publishing lifecycle events on a
//! [`Notifier`] along the way.
//!
//! ## Event flow
//! ```text
//! start() ──► Start{0, T} ──► attempt ──► Ok, no done ──► sleep(delay) ──► attempt ...
//!    │                           ├──► Err ──► Error(e) ──► sleep(delay) ──► attempt ...
//!    │                           └──► done(p) ──► Success(p) ──► Close
//!    ├──► every 1s:  Second{n, T-n}
//!    └──► at timeout: Timeout ──► Close
//! ```
//!
//! ## Rules
//! - At most **one** terminal event (`Success` or `Timeout`) per run, always followed by `Close`.
//! - `Error` is never published after the terminal event of its run.
//! - `close()` on an inactive poller is a no-op (no duplicate `Close`).
//! - Every resumption point (attempt entry, settle, tick, `done`) re-checks that its
//!   run is still the active one; results from closed or superseded runs are dropped.
//! - Attempts are never aborted; only timers are. The task sees the closed run
//!   through its [`AbortSignal`] and may stop cooperatively.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{builder::PollerBuilder, config::PollerConfig, runner::run_once, timers::TimerSet},
    error::TaskError,
    events::{Event, EventKind, Notifier, Subscription, TrackingTime},
    tasks::{AbortSignal, Done, TaskContext, TaskRef},
};

/// Lifecycle state of a [`Poller`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PollerState {
    /// Not polling. Initial state, and the state after every `close()`.
    #[default]
    Inactive,
    /// A run is in progress.
    Active,
}

/// Mutable state of the current run.
struct Run {
    state: PollerState,
    /// Bumped on every `start()`; stale callbacks compare against it.
    generation: u64,
    attempt: u32,
    token: CancellationToken,
    tracking: TrackingTime,
    timers: TimerSet,
}

impl Run {
    fn new() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self {
            state: PollerState::Inactive,
            generation: 0,
            attempt: 0,
            token,
            tracking: TrackingTime::default(),
            timers: TimerSet::default(),
        }
    }

    #[inline]
    fn is_current(&self, generation: u64) -> bool {
        self.state == PollerState::Active && self.generation == generation
    }
}

struct Inner<P> {
    task: TaskRef<P>,
    config: PollerConfig,
    total_secs: u64,
    notifier: Notifier<P>,
    run: Mutex<Run>,
    /// Serializes "check state, then publish" sections. Reentrant so handlers
    /// may call `start`/`close`/`destroy` from inside a dispatch.
    ///
    /// Lock order: `dispatch` before `run`.
    dispatch: ReentrantMutex<()>,
}

/// Repeatedly runs a task on a fixed delay until it completes or times out.
///
/// Cheap to clone: clones control the same poller, so a handle can be moved
/// into event handlers.
///
/// ## Example
/// ```rust
/// use taskpoll::{Poller, PollerConfig, TaskContext, TaskError, TaskFn, TaskRef};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let task: TaskRef<&'static str> =
///         TaskFn::arc("status", |ctx: TaskContext<&'static str>| async move {
///             ctx.done("active");
///             Ok::<_, TaskError>(())
///         });
///
///     let poller = Poller::new(task, PollerConfig::from_millis(1000, 5000));
///     let (tx, rx) = tokio::sync::oneshot::channel();
///     let tx = std::sync::Mutex::new(Some(tx));
///     poller.on_success(move |status| {
///         if let Some(tx) = tx.lock().unwrap().take() {
///             let _ = tx.send(*status);
///         }
///     });
///
///     poller.start();
///     assert_eq!(rx.await.unwrap(), "active");
///     assert!(!poller.is_active());
/// }
/// ```
pub struct Poller<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Poller<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: 'static> fmt::Debug for Poller<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.inner.run.lock();
        f.debug_struct("Poller")
            .field("task", &self.inner.task.name())
            .field("config", &self.inner.config)
            .field("state", &run.state)
            .field("tracking", &run.tracking)
            .field("timers_armed", &run.timers.is_armed())
            .finish()
    }
}

/// Creates a poller for `task` with the default configuration
/// (`delay = 3s`, `timeout = 30s`).
pub fn polling<P: Send + 'static>(task: TaskRef<P>) -> Poller<P> {
    Poller::with_defaults(task)
}

impl<P: Send + 'static> Poller<P> {
    /// Creates an inactive poller.
    pub fn new(task: TaskRef<P>, config: PollerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                task,
                config,
                total_secs: config.timeout_secs(),
                notifier: Notifier::new(),
                run: Mutex::new(Run::new()),
                dispatch: ReentrantMutex::new(()),
            }),
        }
    }

    /// Creates an inactive poller with [`PollerConfig::default`].
    pub fn with_defaults(task: TaskRef<P>) -> Self {
        Self::new(task, PollerConfig::default())
    }

    /// Starts configuring a poller for `task`.
    pub fn builder(task: TaskRef<P>) -> PollerBuilder<P> {
        PollerBuilder::new(task)
    }

    /// Starts (or restarts) a run.
    ///
    /// Publishes `start` with `{passed: 0, remaining: timeout_secs}` before
    /// returning, arms the timeout and tracking timers, then launches the first
    /// attempt immediately. Calling it while active cancels the current run's
    /// token and timers and begins a fresh run.
    ///
    /// Outside of a Tokio runtime there is nothing to drive the timers, so the
    /// call is logged and ignored; the poller stays inactive.
    pub fn start(&self) {
        let Ok(rt) = Handle::try_current() else {
            tracing::warn!(
                task = %self.inner.task.name(),
                "start called outside of a Tokio runtime; ignored"
            );
            return;
        };
        self.inner.start(&rt);
    }

    /// Stops the current run and publishes `close`.
    ///
    /// No-op when already inactive.
    pub fn close(&self) {
        self.inner.finish(None, None);
    }

    /// Closes the poller and drops every subscription.
    pub fn destroy(&self) {
        self.close();
        self.inner.notifier.clear();
    }

    /// Drops every subscription without touching the run.
    ///
    /// Timers already in flight keep running but reach no handler.
    pub fn remove_all_listeners(&self) {
        self.inner.notifier.clear();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollerState {
        self.inner.run.lock().state
    }

    /// True while a run is in progress.
    pub fn is_active(&self) -> bool {
        self.state() == PollerState::Active
    }

    /// Last tracking value of the current (or most recent) run.
    pub fn tracking(&self) -> TrackingTime {
        self.inner.run.lock().tracking
    }

    /// Timing configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    /// Name of the polled task.
    pub fn task_name(&self) -> &str {
        self.inner.task.name()
    }

    /// The notifier events are published on.
    pub fn notifier(&self) -> &Notifier<P> {
        &self.inner.notifier
    }

    /// Registers `handler` for `kind`. See [`Notifier::subscribe`].
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(kind, handler)
    }

    /// Subscribes to `start`.
    pub fn on_start<F>(&self, f: F) -> Subscription
    where
        F: Fn(TrackingTime) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Start, move |ev| {
            if let Some(t) = ev.tracking() {
                f(t)
            }
        })
    }

    /// Subscribes to `second`.
    pub fn on_second<F>(&self, f: F) -> Subscription
    where
        F: Fn(TrackingTime) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Second, move |ev| {
            if let Some(t) = ev.tracking() {
                f(t)
            }
        })
    }

    /// Subscribes to `success`.
    pub fn on_success<F>(&self, f: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Success, move |ev| {
            if let Some(p) = ev.payload() {
                f(p)
            }
        })
    }

    /// Subscribes to `error`.
    pub fn on_error<F>(&self, f: F) -> Subscription
    where
        F: Fn(&TaskError) + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Error, move |ev| {
            if let Some(e) = ev.error() {
                f(e)
            }
        })
    }

    /// Subscribes to `timeout`.
    pub fn on_timeout<F>(&self, f: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Timeout, move |_| f())
    }

    /// Subscribes to `close`.
    pub fn on_close<F>(&self, f: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(EventKind::Close, move |_| f())
    }
}

impl<P: Send + 'static> Inner<P> {
    fn start(self: &Arc<Self>, rt: &Handle) {
        let _serial = self.dispatch.lock();

        let (generation, tracking, previous) = {
            let mut run = self.run.lock();
            run.token.cancel();
            let previous = run.timers.take();

            run.generation += 1;
            run.attempt = 0;
            run.state = PollerState::Active;
            run.token = CancellationToken::new();
            run.tracking = TrackingTime::initial(self.total_secs);
            (run.generation, run.tracking, previous)
        };
        drop(previous);

        tracing::debug!(
            task = %self.task.name(),
            run = generation,
            delay = ?self.config.delay_clamped(),
            timeout = ?self.config.timeout_clamped(),
            "poller started"
        );
        self.notifier.publish(&Event::Start(tracking));

        let started = Instant::now();
        {
            let mut run = self.run.lock();
            // a start handler may already have closed or restarted the poller
            if !run.is_current(generation) {
                return;
            }
            run.timers
                .arm_timeout(self.spawn_timeout(rt, generation, started));
            run.timers
                .arm_tracking(self.spawn_tracking(rt, generation, started));
        }
        self.execute(rt, generation);
    }

    /// Deactivates the run and publishes `terminal` (if any) followed by `close`.
    ///
    /// With `generation = Some(g)` only run `g` may be finished; `None` finishes
    /// whatever run is active. Returns `false` if nothing was active.
    fn finish(&self, generation: Option<u64>, terminal: Option<Event<P>>) -> bool {
        let _serial = self.dispatch.lock();

        let (finished, mut timers, token) = {
            let mut run = self.run.lock();
            let live = match generation {
                Some(g) => run.is_current(g),
                None => run.state == PollerState::Active,
            };
            if !live {
                return false;
            }
            run.state = PollerState::Inactive;
            (run.generation, run.timers.take(), run.token.clone())
        };
        token.cancel();
        timers.cancel();

        tracing::debug!(
            task = %self.task.name(),
            run = finished,
            reason = terminal.as_ref().map_or("closed", |ev| ev.kind().as_label()),
            "poller closed"
        );
        if let Some(ev) = terminal {
            self.notifier.publish(&ev);
        }
        self.notifier.publish(&Event::Close);
        true
    }

    fn succeed(&self, generation: u64, payload: P) {
        self.finish(Some(generation), Some(Event::Success(payload)));
    }

    fn expire(&self, generation: u64) {
        self.finish(Some(generation), Some(Event::Timeout));
    }

    fn report(&self, generation: u64, err: TaskError) {
        let _serial = self.dispatch.lock();
        let attempt = {
            let run = self.run.lock();
            if !run.is_current(generation) {
                return;
            }
            run.attempt
        };
        tracing::debug!(
            task = %self.task.name(),
            run = generation,
            attempt,
            error = %err,
            label = err.as_label(),
            "attempt failed"
        );
        self.notifier.publish(&Event::Error(err));
    }

    /// Advances the tracking time and publishes `second`.
    ///
    /// Returns whether the tracking timer should re-arm.
    fn tick(&self, generation: u64) -> bool {
        let _serial = self.dispatch.lock();
        let next = {
            let mut run = self.run.lock();
            if !run.is_current(generation) {
                return false;
            }
            let next = run.tracking.tick(self.total_secs);
            // the timeout timer owns the instant the run reaches its timeout
            if Duration::from_secs(next.passed) >= self.config.timeout_clamped() {
                return false;
            }
            run.tracking = next;
            next
        };
        self.notifier.publish(&Event::Second(next));
        self.run.lock().is_current(generation)
    }

    fn done_handle(self: &Arc<Self>, generation: u64) -> Done<P> {
        let weak: Weak<Self> = Arc::downgrade(self);
        Done::new(move |payload: P| {
            if let Some(inner) = weak.upgrade() {
                inner.succeed(generation, payload);
            }
        })
    }

    fn spawn_timeout(
        self: &Arc<Self>,
        rt: &Handle,
        generation: u64,
        started: Instant,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        // a timeout past the end of the clock never fires
        let deadline = started.checked_add(self.config.timeout_clamped());
        rt.spawn(async move {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            tracing::debug!(task = %this.task.name(), run = generation, "poller timed out");
            this.expire(generation);
        })
    }

    fn spawn_tracking(
        self: &Arc<Self>,
        rt: &Handle,
        generation: u64,
        started: Instant,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        rt.spawn(async move {
            let mut next = started;
            loop {
                next += Duration::from_secs(1);
                time::sleep_until(next).await;
                if !this.tick(generation) {
                    break;
                }
            }
        })
    }

    /// Launches one attempt of run `generation` on its own task.
    fn execute(self: &Arc<Self>, rt: &Handle, generation: u64) {
        let this = Arc::clone(self);
        rt.spawn(async move { this.attempt(generation).await });
    }

    async fn attempt(self: Arc<Self>, generation: u64) {
        let ctx = {
            let mut run = self.run.lock();
            // a close may have raced the delay timer that scheduled us
            if !run.is_current(generation) {
                return;
            }
            run.attempt += 1;
            tracing::trace!(
                task = %self.task.name(),
                run = generation,
                attempt = run.attempt,
                "attempt starting"
            );
            TaskContext::new(
                self.done_handle(generation),
                AbortSignal::new(run.token.clone()),
            )
        };

        match run_once(self.task.as_ref(), ctx).await {
            Ok(()) => {}
            Err(e) if e.is_reportable() => self.report(generation, e),
            Err(_canceled) => {}
        }
        self.schedule_next(generation);
    }

    /// Arms the delay timer for the next attempt if run `generation` is still active.
    fn schedule_next(self: &Arc<Self>, generation: u64) {
        let mut run = self.run.lock();
        if !run.is_current(generation) {
            return;
        }
        let this = Arc::clone(self);
        let delay = self.config.delay_clamped();
        let rt = Handle::current();
        let spawner = rt.clone();
        let handle = spawner.spawn(async move {
            time::sleep(delay).await;
            this.execute(&rt, generation);
        });
        run.timers.arm_delay(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    fn idle_task() -> TaskRef<()> {
        TaskFn::arc("idle", |_ctx: TaskContext<()>| async { Ok::<(), TaskError>(()) })
    }

    #[test]
    fn test_new_poller_is_inactive() {
        let poller = Poller::with_defaults(idle_task());
        assert_eq!(poller.state(), PollerState::Inactive);
        assert_eq!(poller.tracking(), TrackingTime::default());
        assert_eq!(poller.task_name(), "idle");
    }

    #[test]
    fn test_start_outside_runtime_is_ignored() {
        let poller = Poller::with_defaults(idle_task());
        let starts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let s = Arc::clone(&starts);
        poller.on_start(move |_| {
            s.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        poller.start();

        assert_eq!(poller.state(), PollerState::Inactive);
        assert_eq!(starts.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!poller.inner.run.lock().timers.is_armed());
    }

    #[test]
    fn test_polling_uses_default_config() {
        let poller = polling(idle_task());
        assert_eq!(*poller.config(), PollerConfig::default());
        assert!(format!("{poller:?}").contains("Inactive"));
    }

    #[test]
    fn test_close_before_start_is_noop() {
        let poller = Poller::with_defaults(idle_task());
        let closes = Arc::new(Mutex::new(0));
        let c = Arc::clone(&closes);
        poller.on_close(move || *c.lock() += 1);

        poller.close();
        assert_eq!(*closes.lock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_publishes_synchronously_and_arms_timers() {
        let poller = Poller::new(idle_task(), PollerConfig::from_millis(1000, 5000));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        poller.on_start(move |t| s.lock().push(t));

        poller.start();

        assert_eq!(*seen.lock(), vec![TrackingTime::new(0, 5)]);
        assert!(poller.is_active());
        assert!(poller.inner.run.lock().timers.is_armed());

        poller.close();
        assert!(!poller.is_active());
        assert!(!poller.inner.run.lock().timers.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_bumps_generation_and_replaces_token() {
        let poller = Poller::with_defaults(idle_task());
        poller.start();
        let (first_gen, first_token) = {
            let run = poller.inner.run.lock();
            (run.generation, run.token.clone())
        };

        poller.start();
        let run = poller.inner.run.lock();
        assert_eq!(run.generation, first_gen + 1);
        assert!(first_token.is_cancelled());
        assert!(!run.token.is_cancelled());
        assert_eq!(run.state, PollerState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_cannot_finish_new_run() {
        let poller = Poller::with_defaults(idle_task());
        poller.start();
        let stale = poller.inner.run.lock().generation;
        poller.start();

        assert!(!poller.inner.finish(Some(stale), Some(Event::Success(()))));
        assert!(poller.is_active());
    }
}
