//! Registry of named polling timers
//!
//! Each name owns at most one tokio task. The task sleeps, runs the handler,
//! waits for it to settle and only then schedules the next run, so a handler
//! never overlaps with itself.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::backoff::LinearBackoff;
use crate::error::PollError;

type Handler = Arc<dyn Fn() -> BoxFuture<'static, Result<(), PollError>> + Send + Sync>;

/// Bookkeeping for one named timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStatus {
    /// Consecutive failed runs, 0 after any success
    pub fail_count: u32,
    /// Delay scheduled before the next run
    pub next_delay: Duration,
    /// Completed runs, successful or not
    pub runs: u64,
    /// Error of the most recent run, if it failed
    pub last_error: Option<PollError>,
}

impl PollStatus {
    fn new(first_delay: Duration) -> Self {
        Self {
            fail_count: 0,
            next_delay: first_delay,
            runs: 0,
            last_error: None,
        }
    }
}

struct PollEntry {
    handle: JoinHandle<()>,
    status: Arc<Mutex<PollStatus>>,
}

#[derive(Default)]
struct RegistryInner {
    entries: Mutex<HashMap<String, PollEntry>>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        for (name, entry) in self.entries.get_mut().drain() {
            tracing::debug!("Stopping poll '{}' on registry drop", name);
            entry.handle.abort();
        }
    }
}

/// Named-timer registry.
///
/// Cloning yields another handle to the same set of timers. When the last
/// handle is dropped every timer is aborted. Names are unique per registry
/// only, so independent registries never interfere.
///
/// Timers are tokio tasks; starting one requires a running tokio runtime.
#[derive(Clone, Default)]
pub struct PollingRegistry {
    inner: Arc<RegistryInner>,
}

impl PollingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling `handler` under `name`.
    ///
    /// The first run happens after `interval`, or right away when `immediate`
    /// is set. Returns `false` without touching the existing timer when `name`
    /// is already registered.
    pub fn start_polling<F, Fut, E>(
        &self,
        name: impl Into<String>,
        interval: Duration,
        handler: F,
        immediate: bool,
    ) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.start_polling_with_backoff(name, LinearBackoff::new(interval), handler, immediate)
    }

    /// Like [`start_polling`](Self::start_polling) with an explicit back-off policy.
    pub fn start_polling_with_backoff<F, Fut, E>(
        &self,
        name: impl Into<String>,
        backoff: LinearBackoff,
        handler: F,
        immediate: bool,
    ) -> bool
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let name = name.into();
        let mut entries = self.inner.entries.lock();

        if entries
            .get(&name)
            .is_some_and(|existing| !existing.handle.is_finished())
        {
            tracing::debug!("Poll '{}' is already running, ignoring start", name);
            return false;
        }

        let handler: Handler = Arc::new(move || {
            let run = handler();
            async move { run.await.map_err(PollError::handler) }.boxed()
        });

        let first_delay = if immediate {
            Duration::ZERO
        } else {
            backoff.interval()
        };
        let status = Arc::new(Mutex::new(PollStatus::new(first_delay)));
        let handle = tokio::spawn(run_loop(name.clone(), backoff, handler, status.clone()));

        tracing::debug!(
            "Started poll '{}' every {:?} (immediate: {})",
            name,
            backoff.interval(),
            immediate
        );
        entries.insert(name, PollEntry { handle, status });
        true
    }

    /// Stop the timer registered under `name`.
    ///
    /// Returns whether a timer was registered. Unknown names are ignored.
    pub fn stop_polling(&self, name: &str) -> bool {
        let removed = self.inner.entries.lock().remove(name);
        match removed {
            Some(entry) => {
                entry.handle.abort();
                tracing::debug!("Stopped poll '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Stop every timer in this registry.
    pub fn stop_all(&self) {
        let drained: Vec<(String, PollEntry)> = self.inner.entries.lock().drain().collect();
        for (name, entry) in drained {
            entry.handle.abort();
            tracing::debug!("Stopped poll '{}'", name);
        }
    }

    pub fn is_polling(&self, name: &str) -> bool {
        self.inner
            .entries
            .lock()
            .get(name)
            .is_some_and(|entry| !entry.handle.is_finished())
    }

    /// Snapshot of the bookkeeping for `name`
    pub fn status(&self, name: &str) -> Option<PollStatus> {
        self.inner
            .entries
            .lock()
            .get(name)
            .map(|entry| entry.status.lock().clone())
    }

    /// Names of all registered timers, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for PollingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingRegistry")
            .field("names", &self.names())
            .finish()
    }
}

async fn run_loop(
    name: String,
    backoff: LinearBackoff,
    handler: Handler,
    status: Arc<Mutex<PollStatus>>,
) {
    let mut delay = status.lock().next_delay;

    loop {
        if delay.is_zero() {
            // A handler that settles without pending would otherwise never
            // give the worker back.
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        let outcome = handler().await;

        delay = {
            let mut status = status.lock();
            match outcome {
                Ok(()) => {
                    status.fail_count = 0;
                    status.last_error = None;
                }
                Err(e) => {
                    status.fail_count = status.fail_count.saturating_add(1);
                    tracing::warn!(
                        "Poll '{}' failed ({} in a row): {}",
                        name,
                        status.fail_count,
                        e
                    );
                    status.last_error = Some(e);
                }
            }
            status.runs += 1;
            status.next_delay = backoff.delay_after(status.fail_count);
            status.next_delay
        };
    }
}
