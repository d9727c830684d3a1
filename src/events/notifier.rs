//! # Notifier: synchronous typed publish/subscribe.
//!
//! [`Notifier`] keeps an ordered handler list per [`EventKind`] and dispatches
//! each published [`Event`] to the handlers of its channel, in registration order,
//! on the caller's thread.
//!
//! ## Architecture
//! ```text
//! Publisher (Poller):                    Handlers (many):
//!                                   ┌──► handler #1 (registration order)
//!   publish(&Event) ──► snapshot ───┼──► handler #2
//!                      (per kind)   └──► handler #N
//! ```
//!
//! ## Rules
//! - **Snapshot dispatch**: the handler list is cloned before the pass, so a handler
//!   that subscribes, unsubscribes or clears never changes the current pass.
//! - **No error on empty channels**: publishing with zero handlers is a no-op.
//! - **Panic isolation**: a panicking handler is logged and skipped; the rest of
//!   the pass still runs.
//! - **Best-effort**: no queueing, no retries; slow handlers slow the publisher.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::event::{Event, EventKind};

/// Shared handler callback.
type Handler<P> = Arc<dyn Fn(&Event<P>) + Send + Sync>;

/// Handler lists keyed by channel. Ids make every registration unique.
struct Registry<P> {
    next_id: u64,
    channels: HashMap<EventKind, Vec<(u64, Handler<P>)>>,
}

impl<P> Registry<P> {
    fn new() -> Self {
        Self {
            next_id: 0,
            channels: HashMap::new(),
        }
    }

    fn remove(&mut self, kind: EventKind, id: u64) -> bool {
        let Some(handlers) = self.channels.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        before != handlers.len()
    }
}

/// Typed publish/subscribe primitive.
///
/// Cheap to clone: clones share the same handler registry.
///
/// ## Example
/// ```rust
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// use taskpoll::{Event, EventKind, Notifier};
///
/// let notifier: Notifier<&'static str> = Notifier::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let h = Arc::clone(&hits);
/// let sub = notifier.subscribe(EventKind::Success, move |_ev| {
///     h.fetch_add(1, Ordering::SeqCst);
/// });
///
/// notifier.publish(&Event::Success("active"));
/// sub.unsubscribe();
/// notifier.publish(&Event::Success("active"));
///
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct Notifier<P> {
    registry: Arc<Mutex<Registry<P>>>,
}

impl<P> Clone for Notifier<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> Default for Notifier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for Notifier<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reg = self.registry.lock();
        let handlers: usize = reg.channels.values().map(Vec::len).sum();
        f.debug_struct("Notifier")
            .field("handlers", &handlers)
            .finish()
    }
}

impl<P> Notifier<P> {
    /// Creates a notifier with no handlers.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    /// Removes every handler on every channel.
    ///
    /// Subsequent publishes are no-ops until new subscriptions are made.
    /// Outstanding [`Subscription`]s become inert.
    pub fn clear(&self) {
        self.registry.lock().channels.clear();
    }

    /// Number of handlers currently registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .channels
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// True if no channel has a handler.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().channels.values().all(Vec::is_empty)
    }

    fn snapshot(&self, kind: EventKind) -> Vec<Handler<P>> {
        self.registry
            .lock()
            .channels
            .get(&kind)
            .map(|hs| hs.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }
}

impl<P: 'static> Notifier<P> {
    /// Registers `handler` for `kind` and returns its unsubscribe handle.
    ///
    /// Handlers on the same channel run in registration order. Dropping the
    /// returned [`Subscription`] does **not** unsubscribe.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Event<P>) + Send + Sync + 'static,
    {
        let id = {
            let mut reg = self.registry.lock();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.channels
                .entry(kind)
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };

        let weak: Weak<Mutex<Registry<P>>> = Arc::downgrade(&self.registry);
        Subscription::new(kind, move || {
            weak.upgrade()
                .map(|reg| reg.lock().remove(kind, id))
                .unwrap_or(false)
        })
    }

    /// Synchronously invokes every handler registered for the event's channel.
    ///
    /// The handler list is snapshotted first; the registry lock is not held while
    /// handlers run.
    pub fn publish(&self, event: &Event<P>) {
        let kind = event.kind();
        for handler in self.snapshot(kind) {
            let res = panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
            if res.is_err() {
                tracing::warn!(channel = %kind, "event handler panicked; skipped");
            }
        }
    }
}

/// Unsubscribe handle returned by [`Notifier::subscribe`].
///
/// Removes exactly the handler it was created for, leaving other handlers on
/// the same channel untouched.
pub struct Subscription {
    kind: EventKind,
    remove: Box<dyn FnOnce() -> bool + Send + Sync>,
}

impl Subscription {
    fn new(kind: EventKind, remove: impl FnOnce() -> bool + Send + Sync + 'static) -> Self {
        Self {
            kind,
            remove: Box::new(remove),
        }
    }

    /// Channel the handler was registered on.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes the handler.
    ///
    /// Returns `false` if it was already gone (e.g. after [`Notifier::clear`]).
    pub fn unsubscribe(self) -> bool {
        (self.remove)()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TrackingTime;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Notifier<&'static str>) {
        (Arc::new(Mutex::new(Vec::new())), Notifier::new())
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let (log, n) = recorder();
        for tag in ["a", "b", "c"] {
            let log = Arc::clone(&log);
            n.subscribe(EventKind::Close, move |_| log.lock().push(tag.into()));
        }
        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_publish_only_reaches_matching_channel() {
        let (log, n) = recorder();
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Timeout, move |_| l.lock().push("timeout".into()));

        n.publish(&Event::Close);
        n.publish(&Event::Start(TrackingTime::initial(30)));
        assert!(log.lock().is_empty());

        n.publish(&Event::Timeout);
        assert_eq!(*log.lock(), vec!["timeout"]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let (log, n) = recorder();
        let l1 = Arc::clone(&log);
        let first = n.subscribe(EventKind::Success, move |ev| {
            l1.lock().push(format!("first:{}", ev.payload().copied().unwrap_or("")));
        });
        let l2 = Arc::clone(&log);
        n.subscribe(EventKind::Success, move |ev| {
            l2.lock().push(format!("second:{}", ev.payload().copied().unwrap_or("")));
        });

        assert!(first.unsubscribe());
        n.publish(&Event::Success("active"));

        assert_eq!(*log.lock(), vec!["second:active"]);
        assert_eq!(n.listener_count(EventKind::Success), 1);
    }

    #[test]
    fn test_duplicate_registrations_are_removed_one_at_a_time() {
        let (log, n) = recorder();
        let l = Arc::clone(&log);
        let a = n.subscribe(EventKind::Close, move |_| l.lock().push("x".into()));
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| l.lock().push("x".into()));

        a.unsubscribe();
        n.publish(&Event::Close);
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_subscribe_during_dispatch_does_not_affect_current_pass() {
        let (log, n) = recorder();
        let inner = n.clone();
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| {
            l.lock().push("outer".into());
            let l2 = Arc::clone(&l);
            inner.subscribe(EventKind::Close, move |_| l2.lock().push("late".into()));
        });

        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["outer"]);

        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["outer", "outer", "late"]);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_does_not_affect_current_pass() {
        let (log, n) = recorder();
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let v = Arc::clone(&victim);
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| {
            l.lock().push("killer".into());
            if let Some(sub) = v.lock().take() {
                sub.unsubscribe();
            }
        });
        let l = Arc::clone(&log);
        let sub = n.subscribe(EventKind::Close, move |_| l.lock().push("victim".into()));
        *victim.lock() = Some(sub);

        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["killer", "victim"]);

        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["killer", "victim", "killer"]);
    }

    #[test]
    fn test_clear_during_dispatch_finishes_current_pass() {
        let (log, n) = recorder();
        let inner = n.clone();
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| {
            l.lock().push("a".into());
            inner.clear();
        });
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| l.lock().push("b".into()));

        n.publish(&Event::Close);
        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert!(n.is_empty());
    }

    #[test]
    fn test_clear_makes_publish_a_noop_and_subscriptions_inert() {
        let (log, n) = recorder();
        let l = Arc::clone(&log);
        let sub = n.subscribe(EventKind::Timeout, move |_| l.lock().push("t".into()));

        n.clear();
        n.publish(&Event::Timeout);

        assert!(log.lock().is_empty());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let n: Notifier<()> = Notifier::new();
        n.publish(&Event::Success(()));
        assert_eq!(n.listener_count(EventKind::Success), 0);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_dispatch() {
        let (log, n) = recorder();
        n.subscribe(EventKind::Close, |_| panic!("handler exploded"));
        let l = Arc::clone(&log);
        n.subscribe(EventKind::Close, move |_| l.lock().push("after".into()));

        n.publish(&Event::Close);
        assert_eq!(*log.lock(), vec!["after"]);
    }

    #[test]
    fn test_unsubscribe_after_notifier_dropped() {
        let n: Notifier<()> = Notifier::new();
        let sub = n.subscribe(EventKind::Start, |_| {});
        drop(n);
        assert!(!sub.unsubscribe());
    }
}
