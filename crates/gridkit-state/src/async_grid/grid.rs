//! A mounted server-backed grid

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gridkit_core::{Filters, GridError, GridResult, OrderSpec, PageInfo, PageItem, Row, RowId};
use gridkit_polling::PollingRegistry;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::loader::GridLoader;
use super::source::DataSource;
use super::state::{AsyncGridState, RowMatcher};
use crate::defaults::GridDefaults;
use crate::query_string::{DEFAULT_QUERY_PARAM, Location, QueryStringSync};

struct UrlBinding {
    sync: QueryStringSync,
    location: Box<dyn Location + Send>,
}

struct AutoReload {
    registry: PollingRegistry,
    name: String,
    interval: Duration,
}

/// Configures and mounts an [`AsyncGrid`]
pub struct AsyncGridBuilder {
    source: Arc<dyn DataSource>,
    defaults: GridDefaults,
    location: Option<Box<dyn Location + Send>>,
    query_param: String,
    auto_reload: Option<AutoReload>,
}

impl AsyncGridBuilder {
    pub fn defaults(mut self, defaults: GridDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Adjust the defaults set so far.
    pub fn update_defaults(mut self, f: impl FnOnce(GridDefaults) -> GridDefaults) -> Self {
        self.defaults = f(std::mem::take(&mut self.defaults));
        self
    }

    /// Keep grid state mirrored in a query parameter of `location`.
    pub fn location(mut self, location: impl Location + Send + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    /// Query parameter holding the grid token (default `state`)
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Silently reload every `interval` through `registry` under `name`.
    pub fn auto_reload(
        mut self,
        registry: &PollingRegistry,
        name: impl Into<String>,
        interval: Duration,
    ) -> Self {
        self.auto_reload = Some(AutoReload {
            registry: registry.clone(),
            name: name.into(),
            interval,
        });
        self
    }

    /// Mount the grid.
    ///
    /// Restores state from the location when one is configured, starts the
    /// first fetch and the auto-reload timer. Must be called from within a
    /// tokio runtime.
    pub fn mount(self) -> AsyncGrid {
        let mut state = AsyncGridState::new(&self.defaults);

        let url = self.location.map(|location| {
            let mut sync = QueryStringSync::new(self.query_param);
            if let Some(restored) = sync.pull(&*location, &self.defaults) {
                state.apply_restored(&restored);
            }
            Mutex::new(UrlBinding { sync, location })
        });

        let state = Arc::new(Mutex::new(state));
        let loader = Arc::new(GridLoader::new(self.source, state.clone()));

        let polling = self
            .auto_reload
            .filter(|auto| start_auto_reload(&loader, auto));

        let grid = AsyncGrid {
            state,
            loader,
            defaults: self.defaults,
            url,
            polling,
            shut_down: AtomicBool::new(false),
        };
        grid.loader.reload(false);
        tracing::debug!("Mounted grid");
        grid
    }
}

/// Returns whether the registry accepted the name.
fn start_auto_reload(loader: &Arc<GridLoader>, auto: &AutoReload) -> bool {
    let loader = Arc::downgrade(loader);
    let started = auto.registry.start_polling(
        auto.name.clone(),
        auto.interval,
        move || {
            let loader = loader.upgrade();
            async move {
                let Some(loader) = loader else {
                    return Ok(());
                };
                match loader.reload_and_wait(true).await {
                    Err(GridError::Cancelled) => Ok(()),
                    other => other,
                }
            }
        },
        false,
    );
    if !started {
        tracing::warn!(
            "Auto-reload '{}' is already registered, grid will not poll",
            auto.name
        );
    }
    started
}

/// Server-backed grid with its fetch loop, URL binding and auto-reload.
///
/// Every action records the change, mirrors it into the URL and starts a
/// fetch. The returned handle resolves when that fetch settles; it may be
/// dropped. Row and selection edits stay local.
pub struct AsyncGrid {
    state: Arc<Mutex<AsyncGridState>>,
    loader: Arc<GridLoader>,
    defaults: GridDefaults,
    url: Option<Mutex<UrlBinding>>,
    polling: Option<AutoReload>,
    shut_down: AtomicBool,
}

impl AsyncGrid {
    pub fn builder(source: Arc<dyn DataSource>) -> AsyncGridBuilder {
        AsyncGridBuilder {
            source,
            defaults: GridDefaults::default(),
            location: None,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            auto_reload: None,
        }
    }

    pub fn defaults(&self) -> &GridDefaults {
        &self.defaults
    }

    pub fn loader(&self) -> &GridLoader {
        &self.loader
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> AsyncGridState {
        self.state.lock().clone()
    }

    /// Read the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&AsyncGridState) -> R) -> R {
        f(&*self.state.lock())
    }

    pub fn page_info(&self) -> PageInfo {
        self.state.lock().page_info()
    }

    /// Page-number strip sized by the configured `max_visible_pages`
    pub fn visible_pages(&self) -> Vec<PageItem> {
        self.state
            .lock()
            .visible_pages(self.defaults.max_visible_pages)
    }

    pub fn set_order(
        &self,
        ordering: OrderSpec,
        reset_offset: bool,
    ) -> JoinHandle<GridResult<()>> {
        self.change(|state| state.set_order(ordering, reset_offset))
    }

    pub fn toggle_order(&self, column: &str, reset_offset: bool) -> JoinHandle<GridResult<()>> {
        self.change(|state| state.toggle_order(column, reset_offset))
    }

    pub fn apply_filters(
        &self,
        filters: Filters,
        reset_offset: bool,
    ) -> JoinHandle<GridResult<()>> {
        self.change(|state| state.apply_filters(filters, reset_offset))
    }

    pub fn reset_filters(&self) -> JoinHandle<GridResult<()>> {
        self.change(AsyncGridState::reset_filters)
    }

    /// Change the page size. With offered page sizes configured, the request
    /// snaps to the closest one.
    pub fn set_limit(&self, limit: usize) -> JoinHandle<GridResult<()>> {
        let size = self.defaults.page_size(limit);
        if size != limit {
            tracing::debug!(requested = limit, size, "Page size not offered, snapping");
        }
        self.change(|state| state.set_limit(size))
    }

    pub fn set_offset(&self, offset: usize) -> JoinHandle<GridResult<()>> {
        self.change(|state| state.set_offset(offset))
    }

    pub fn go_to_page(&self, page: usize) -> JoinHandle<GridResult<()>> {
        self.change(|state| state.go_to_page(page))
    }

    /// Refetch the current page; `silent` keeps the loading flag down.
    pub fn reload(&self, silent: bool) -> JoinHandle<GridResult<()>> {
        if self.is_shut_down() {
            return cancelled();
        }
        self.loader.reload(silent)
    }

    /// React to a navigation of the location (back/forward).
    ///
    /// Returns the fetch handle when the URL carried a different state than
    /// the grid last wrote or read, `None` when it was our own write.
    pub fn location_changed(&self) -> Option<JoinHandle<GridResult<()>>> {
        if self.is_shut_down() {
            return None;
        }
        let restored = {
            let mut binding = self.url.as_ref()?.lock();
            let UrlBinding { sync, location } = &mut *binding;
            sync.pull(&**location, &self.defaults)?
        };
        tracing::debug!(?restored, "Restoring grid state from location");
        self.state.lock().apply_restored(&restored);
        Some(self.loader.reload(false))
    }

    /// Current token in the bound location, if any
    pub fn location_token(&self) -> Option<String> {
        let binding = self.url.as_ref()?.lock();
        binding.location.query_param(binding.sync.param())
    }

    pub fn update_rows(&self, f: impl FnOnce(Vec<Row>) -> Vec<Row>) {
        self.state.lock().update_rows(f);
    }

    pub fn update_row(&self, updates: Row, matcher: &RowMatcher, replace: bool) -> bool {
        self.state.lock().update_row(updates, matcher, replace)
    }

    pub fn select_row(&self, id: RowId, selected: bool) {
        self.state.lock().select_row(id, selected);
    }

    pub fn set_selected_rows(&self, ids: impl IntoIterator<Item = RowId>) {
        self.state.lock().set_selected_rows(ids);
    }

    pub fn clear_selection(&self) {
        self.state.lock().clear_selection();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Abort the in-flight fetch and stop auto-reload.
    ///
    /// Runs once; dropping the grid calls it too.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.loader.shutdown();
        if let Some(auto) = &self.polling {
            auto.registry.stop_polling(&auto.name);
        }
        tracing::debug!("Grid shut down");
    }

    fn change(&self, f: impl FnOnce(&mut AsyncGridState)) -> JoinHandle<GridResult<()>> {
        if self.is_shut_down() {
            return cancelled();
        }
        let token = {
            let mut state = self.state.lock();
            f(&mut *state);
            state.query_token(self.defaults.limit)
        };
        if let Some(url) = &self.url {
            let mut binding = url.lock();
            let UrlBinding { sync, location } = &mut *binding;
            sync.push(&mut **location, &token);
        }
        self.loader.reload(false)
    }
}

impl Drop for AsyncGrid {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for AsyncGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncGrid")
            .field("state", &*self.state.lock())
            .field("loader", &self.loader)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

fn cancelled() -> JoinHandle<GridResult<()>> {
    tokio::spawn(async { Err(GridError::Cancelled) })
}
