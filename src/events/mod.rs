//! Lifecycle events: types and notifier.
//!
//! This module groups the event **data model** and the **notifier** used to
//! publish/subscribe to events emitted by the [`Poller`](crate::Poller).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] channel names and their payloads
//! - [`TrackingTime`] `{passed, remaining}` progress carried by `start`/`second`
//! - [`Notifier`], [`Subscription`] synchronous fan-out with unsubscribe handles
//!
//! ## Quick reference
//! - **Publisher**: the poller's own callbacks (start, ticks, attempts, timeout, close).
//! - **Consumers**: user handlers registered with [`Poller::subscribe`](crate::Poller::subscribe)
//!   or the typed `on_*` helpers.

mod event;
mod notifier;

pub use event::{Event, EventKind, TrackingTime};
pub use notifier::{Notifier, Subscription};
