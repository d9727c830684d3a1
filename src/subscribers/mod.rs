//! # Built-in observers.
//!
//! Observers are plain handlers registered on a poller's notifier. This module
//! ships [`LogWriter`], which logs every lifecycle event (feature `logging`).
//!
//! ## Implementing custom observers
//! ```no_run
//! use taskpoll::{Event, EventKind, Poller};
//!
//! fn count_failures(poller: &Poller<String>) {
//!     poller.subscribe(EventKind::Error, |ev: &Event<String>| {
//!         if let Some(err) = ev.error() {
//!             // increment failure counter
//!             let _ = err.as_label();
//!         }
//!     });
//! }
//! ```

mod log;

pub use log::LogWriter;
