//! Fetch driver for the server-backed grid
//!
//! Every reload snapshots the request parameters, spawns the fetch and
//! aborts whichever fetch was still in flight. Each fetch carries a sequence
//! number; a response whose number is no longer current is dropped, so a slow
//! older response can never overwrite a newer page.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gridkit_core::{GridError, GridResult};
use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

use super::source::{DataSource, FetchRequest};
use super::state::AsyncGridState;

pub struct GridLoader {
    source: Arc<dyn DataSource>,
    state: Arc<Mutex<AsyncGridState>>,
    sequence: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl GridLoader {
    pub fn new(source: Arc<dyn DataSource>, state: Arc<Mutex<AsyncGridState>>) -> Self {
        Self {
            source,
            state,
            sequence: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<Mutex<AsyncGridState>> {
        &self.state
    }

    /// Fetch the page the state currently describes.
    ///
    /// A `silent` reload leaves the loading flag alone. Awaiting the returned
    /// handle is optional; dropping it does not cancel the fetch. Must be
    /// called from within a tokio runtime.
    pub fn reload(&self, silent: bool) -> JoinHandle<GridResult<()>> {
        let (request, seq) = {
            let mut state = self.state.lock();
            state.begin_load(silent);
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            (state.fetch_request(), seq)
        };

        let handle = tokio::spawn(fetch_page(
            self.source.clone(),
            self.state.clone(),
            self.sequence.clone(),
            seq,
            request,
        ));

        if let Some(previous) = self.in_flight.lock().replace(handle.abort_handle()) {
            if !previous.is_finished() {
                tracing::debug!(seq, "Aborting superseded fetch");
                previous.abort();
            }
        }
        handle
    }

    /// Reload and wait for the fetch to settle.
    ///
    /// Resolves to `Err(GridError::Cancelled)` when a newer reload or a
    /// shutdown superseded this one.
    pub async fn reload_and_wait(&self, silent: bool) -> GridResult<()> {
        match self.reload(silent).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(GridError::Cancelled),
            Err(e) => Err(GridError::Other(e.to_string())),
        }
    }

    /// Whether a fetch is still running
    pub fn is_fetching(&self) -> bool {
        self.in_flight
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort the in-flight fetch, if any, and drop its result.
    pub fn shutdown(&self) {
        let in_flight = self.in_flight.lock().take();
        let mut state = self.state.lock();
        self.sequence.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = in_flight {
            if !handle.is_finished() {
                tracing::debug!("Aborting fetch on shutdown");
                handle.abort();
                state.cancel_load();
            }
        }
    }
}

impl Drop for GridLoader {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for GridLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridLoader")
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("fetching", &self.is_fetching())
            .finish_non_exhaustive()
    }
}

#[tracing::instrument(skip(source, state, sequence, request), fields(limit = request.limit, offset = request.offset))]
async fn fetch_page(
    source: Arc<dyn DataSource>,
    state: Arc<Mutex<AsyncGridState>>,
    sequence: Arc<AtomicU64>,
    seq: u64,
    request: FetchRequest,
) -> GridResult<()> {
    let result = source.fetch(request).await;

    let mut state = state.lock();
    if sequence.load(Ordering::SeqCst) != seq {
        tracing::debug!("Dropping stale response");
        return Err(GridError::Cancelled);
    }

    match result {
        Ok(response) => {
            tracing::debug!(
                records = response.records.len(),
                count = response.count,
                "Fetched page"
            );
            state.finish_load(response);
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Fetch failed: {}", e);
            state.fail_load();
            Err(e)
        }
    }
}
