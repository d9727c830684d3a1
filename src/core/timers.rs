//! # Timer set owned by a polling run.
//!
//! Three independent handles, each a spawned Tokio task:
//! - **delay**: sleeps `delay`, then launches the next attempt
//! - **timeout**: sleeps until `start + timeout`, then closes the run
//! - **tracking**: ticks every second, anchored on `start`
//!
//! ## Rules
//! - Arming a slot aborts whatever was armed there before.
//! - Each handle is aborted at most once (`Option::take`).
//! - Dropping the set aborts everything still armed, so no timer outlives the
//!   run that owned it.
//! - Aborting only stops a pending sleep; attempts themselves are never spawned
//!   on these handles and are never aborted.

use tokio::task::JoinHandle;

/// Owned timer handles of the current run.
#[derive(Default, Debug)]
pub(crate) struct TimerSet {
    delay: Option<JoinHandle<()>>,
    timeout: Option<JoinHandle<()>>,
    tracking: Option<JoinHandle<()>>,
}

impl TimerSet {
    pub(crate) fn arm_delay(&mut self, handle: JoinHandle<()>) {
        Self::arm(&mut self.delay, handle);
    }

    pub(crate) fn arm_timeout(&mut self, handle: JoinHandle<()>) {
        Self::arm(&mut self.timeout, handle);
    }

    pub(crate) fn arm_tracking(&mut self, handle: JoinHandle<()>) {
        Self::arm(&mut self.tracking, handle);
    }

    /// Moves all handles out, leaving an empty set behind.
    ///
    /// Lets the caller cancel outside of the lock that guards the set.
    pub(crate) fn take(&mut self) -> TimerSet {
        std::mem::take(self)
    }

    /// Aborts every armed timer.
    pub(crate) fn cancel(&mut self) {
        for slot in [&mut self.delay, &mut self.timeout, &mut self.tracking] {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    /// True if any slot holds a timer that has not finished yet.
    pub(crate) fn is_armed(&self) -> bool {
        [&self.delay, &self.timeout, &self.tracking]
            .into_iter()
            .flatten()
            .any(|h| !h.is_finished())
    }

    fn arm(slot: &mut Option<JoinHandle<()>>, handle: JoinHandle<()>) {
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pending() -> JoinHandle<()> {
        tokio::spawn(async { tokio::time::sleep(Duration::from_secs(3600)).await })
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_all_slots() {
        let mut timers = TimerSet::default();
        timers.arm_delay(pending());
        timers.arm_timeout(pending());
        timers.arm_tracking(pending());
        assert!(timers.is_armed());

        timers.cancel();
        assert!(!timers.is_armed());

        // second cancel has nothing left to abort
        timers.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_aborts_previous_handle() {
        let mut timers = TimerSet::default();
        let first = pending();
        let first_abort = first.abort_handle();
        timers.arm_delay(first);
        timers.arm_delay(pending());

        tokio::task::yield_now().await;
        assert!(first_abort.is_finished());
        assert!(timers.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_then_drop_cancels() {
        let mut timers = TimerSet::default();
        let handle = pending();
        let abort = handle.abort_handle();
        timers.arm_timeout(handle);

        drop(timers.take());
        assert!(!timers.is_armed());

        tokio::task::yield_now().await;
        assert!(abort.is_finished());
    }
}
