//! # Example: status_check
//!
//! Polls a (simulated) deployment status endpoint until it reports `active`.
//!
//! Shows how to:
//! - Define a polling task with [`TaskFn`] that calls `done` on success
//! - Observe progress with [`LogWriter`] and typed `on_*` handlers
//! - Wait for the poller to close
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► build Poller (delay=500ms, timeout=5s)
//!   ├─► start()
//!   │     ├─► attempt #1 → "pending"
//!   │     ├─► attempt #2 → error (503)
//!   │     ├─► attempt #3 → "pending"
//!   │     └─► attempt #4 → "active" → done → success, close
//!   └─► await close
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example status_check --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskpoll::{LogWriter, Poller, TaskContext, TaskError, TaskFn, TaskRef};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// Fake status endpoint: `pending`, a 503, `pending`, then `active`.
async fn fetch_status(call: u32) -> Result<&'static str, String> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    match call {
        0 | 2 => Ok("pending"),
        1 => Err("503 Service Unavailable".to_string()),
        _ => Ok("active"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let task: TaskRef<String> = TaskFn::arc("deployment", move |ctx: TaskContext<String>| {
        let counter = Arc::clone(&counter);
        async move {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            let status = tokio::select! {
                res = fetch_status(call) => res.map_err(TaskError::fail)?,
                _ = ctx.signal().aborted() => return Err(TaskError::Canceled),
            };
            if status == "active" {
                ctx.done(status.to_string());
            }
            Ok::<(), TaskError>(())
        }
    });

    let poller = Poller::builder(task)
        .delay(Duration::from_millis(500))
        .timeout(Duration::from_secs(5))
        .build();

    let _log = LogWriter::attach(&poller);
    poller.on_success(|status| println!("[demo] deployment is {status}"));
    poller.on_timeout(|| println!("[demo] gave up waiting"));

    let closed = Arc::new(Notify::new());
    let notify = Arc::clone(&closed);
    poller.on_close(move || notify.notify_one());

    poller.start();
    closed.notified().await;

    println!("[demo] attempts: {}", calls.load(Ordering::SeqCst));
    poller.destroy();
    Ok(())
}
