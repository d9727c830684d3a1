//! # Polling runtime.
//!
//! ## Components
//! ```text
//! PollerConfig ──► Poller ──► runner::run_once (one attempt, panics caught)
//!                    │
//!                    ├──► TimerSet { delay, timeout, tracking }
//!                    ├──► CancellationToken (fresh per start, shared read-only via AbortSignal)
//!                    └──► Notifier (start / second / success / error / timeout / close)
//! ```
//!
//! ## Timers of one run
//! ```text
//! t=0        start() ── Start{0,T}, attempt #1
//! t=1s..     tracking ── Second{n, T-n}      (stops at n = T)
//! settle+d   delay ── attempt #k+1           (only while active)
//! t=timeout  timeout ── Timeout, Close       (single shot)
//! ```

mod builder;
mod config;
mod poller;
mod runner;
mod timers;

pub use builder::PollerBuilder;
pub use config::PollerConfig;
pub use poller::{polling, Poller, PollerState};
