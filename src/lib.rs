//! # taskpoll
//!
//! **taskpoll** repeatedly runs an async task on a fixed delay until it reports
//! completion, the run times out, or it is closed, and broadcasts lifecycle
//! events to observers while doing so.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                 ┌───────────────────────────────┐
//!                 │  Task (user code)             │
//!                 │  run(TaskContext{done,signal})│
//!                 └───────────────▲───────────────┘
//!                                 │ one attempt at a time
//! ┌───────────────────────────────┴───────────────────────────────────┐
//! │  Poller (state machine: Inactive ⇄ Active)                        │
//! │  - TimerSet { delay, timeout, tracking }                          │
//! │  - CancellationToken (fresh per start, read-only AbortSignal)     │
//! │  - generation counter (stale callbacks are ignored)               │
//! └───────────────────────────────┬───────────────────────────────────┘
//!                                 │ publish(&Event)
//!                                 ▼
//!                 ┌───────────────────────────────┐
//!                 │  Notifier (sync, snapshotted) │
//!                 └───┬───────────┬───────────┬───┘
//!                     ▼           ▼           ▼
//!                 handler #1  handler #2  handler #N
//! ```
//!
//! ### Lifecycle
//! ```text
//! start() ─► publish Start{0, T}
//!         ├─► arm timeout (single shot at T)
//!         ├─► arm tracking (Second{n, T-n} every second)
//!         └─► attempt #1 (immediately)
//!
//! loop {
//!   ├─► inactive or superseded? ─► return
//!   ├─► task.run(ctx)
//!   │     ├─ ctx.done(p) ─► Success(p), Close   (run ends)
//!   │     ├─ Err / panic ─► Error(e)            (run continues)
//!   │     └─ Ok(())      ─► nothing
//!   └─► still active? ─► sleep(delay), next attempt
//! }
//!
//! timeout ─► Timeout, Close;  close() ─► Close (once);  destroy() ─► close() + clear()
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                  |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Polling**       | Fixed-cadence attempts, run-wide timeout, progress ticks.     | [`Poller`], [`PollerState`]                |
//! | **Events**        | Typed channels with unsubscribe handles.                      | [`Notifier`], [`Event`], [`Subscription`]  |
//! | **Tasks**         | Define tasks as trait impls or closures.                      | [`Task`], [`TaskFn`], [`TaskContext`]      |
//! | **Errors**        | Typed failures reported on the `error` channel.               | [`TaskError`]                              |
//! | **Configuration** | Delay and timeout with defaults of 3s / 30s.                  | [`PollerConfig`], [`PollerBuilder`]        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use taskpoll::{Poller, PollerConfig, TaskContext, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let calls = Arc::new(AtomicU32::new(0));
//!     let counter = Arc::clone(&calls);
//!
//!     // Reports "ready" on the third attempt.
//!     let task: TaskRef<&'static str> =
//!         TaskFn::arc("deploy-status", move |ctx: TaskContext<&'static str>| {
//!             let counter = Arc::clone(&counter);
//!             async move {
//!                 if counter.fetch_add(1, Ordering::SeqCst) == 2 {
//!                     ctx.done("ready");
//!                 }
//!                 Ok::<_, TaskError>(())
//!             }
//!         });
//!
//!     let poller = Poller::new(task, PollerConfig::from_millis(10, 5_000));
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     let tx = std::sync::Mutex::new(Some(tx));
//!     poller.on_close(move || {
//!         if let Some(tx) = tx.lock().unwrap().take() {
//!             let _ = tx.send(());
//!         }
//!     });
//!
//!     poller.start();
//!     rx.await.unwrap();
//!     assert_eq!(calls.load(Ordering::SeqCst), 3);
//! }
//! ```
mod core;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use core::{polling, Poller, PollerBuilder, PollerConfig, PollerState};
pub use error::TaskError;
pub use events::{Event, EventKind, Notifier, Subscription, TrackingTime};
pub use tasks::{AbortSignal, Done, Task, TaskContext, TaskFn, TaskRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod subscribers;
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
