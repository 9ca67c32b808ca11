//! Integration tests for AsyncGrid and GridLoader
//!
//! Runs mounted grids against the in-memory MockDataSource with tokio's clock
//! paused, so response delays and poll intervals are deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use gridkit_polling::PollingRegistry;
use gridkit_state::{
    AsyncGrid, AsyncGridState, Filters, GridDefaults, GridError, GridLoader, OrderClause,
    OrderSpec, Row, RowId, RowMatcher, SortDirection,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

use common::{MockDataSource, ids, people, settle};

fn range(from: i64, to: i64) -> Vec<i64> {
    (from..=to).collect()
}

// ============ Fetch lifecycle ============

#[tokio::test(start_paused = true)]
async fn mount_fetches_first_page() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .mount();

    assert!(grid.read(|s| s.loading()), "first load shows the spinner");
    settle(1).await;

    let state = grid.snapshot();
    assert!(!state.loading());
    assert!(!state.loading_error());
    assert_eq!(ids(state.rows()), range(1, 10));
    assert_eq!(state.total_count(), Some(95));
    assert_eq!(state.draws_count(), 1);

    let request = source.last_request().unwrap();
    assert_eq!(request.limit, 10);
    assert_eq!(request.offset, 0);
    assert!(request.order.is_empty());
    assert!(request.filters.is_empty());
}

#[tokio::test(start_paused = true)]
async fn actions_refetch_with_new_parameters() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .mount();
    settle(1).await;

    grid.set_order(OrderSpec::by("name", SortDirection::Desc), true)
        .await
        .unwrap()
        .unwrap();
    let newest_first: Vec<i64> = range(86, 95).into_iter().rev().collect();
    assert_eq!(ids(grid.snapshot().rows()), newest_first);
    assert_eq!(
        source.last_request().unwrap().order,
        vec![OrderClause {
            column: "name".into(),
            direction: SortDirection::Desc,
        }]
    );

    grid.apply_filters(Filters::new().with("q", "bergen").with("city", ""), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grid.snapshot().total_count(), Some(32));
    assert_eq!(
        source.last_request().unwrap().filters,
        Filters::new().with("q", "bergen"),
        "empty filter values never reach the data source"
    );

    grid.set_limit(25).await.unwrap().unwrap();
    grid.go_to_page(2).await.unwrap().unwrap();

    let state = grid.snapshot();
    assert_eq!(state.offset(), 25);
    assert_eq!(state.rows().len(), 7);
    assert_eq!(state.page_info().status_text(), "26-32 of 32 (page 2 of 2)");
    assert_eq!(source.request_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_last_good_rows() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .mount();
    settle(1).await;

    source.set_failing(true);
    let error = assert_err!(assert_ok!(grid.reload(false).await));
    assert!(matches!(error, GridError::Fetch(_)));

    let state = grid.snapshot();
    assert!(state.loading_error());
    assert!(!state.loading());
    assert_eq!(ids(state.rows()), range(1, 10));
    assert_eq!(state.total_count(), Some(95));

    source.set_failing(false);
    assert_ok!(assert_ok!(grid.reload(false).await));
    assert!(!grid.snapshot().loading_error());
}

#[tokio::test(start_paused = true)]
async fn superseded_response_never_lands() {
    let source = Arc::new(
        MockDataSource::new(people(50))
            .with_delay_for_offset(10, Duration::from_millis(500))
            .with_delay_for_offset(20, Duration::from_millis(10)),
    );
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .mount();
    settle(1).await;

    let slow = grid.set_offset(10);
    settle(1).await;
    let fast = grid.set_offset(20);

    fast.await.unwrap().unwrap();
    assert!(slow.await.unwrap_err().is_cancelled());

    settle(1_000).await;
    let state = grid.snapshot();
    assert_eq!(state.offset(), 20);
    assert_eq!(ids(state.rows()), range(21, 30));
    assert_eq!(state.draws_count(), 2);
    assert_eq!(source.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn silent_reload_keeps_loading_flag_down() {
    let source = Arc::new(MockDataSource::new(people(20)).with_delay(Duration::from_millis(100)));
    let grid = AsyncGrid::builder(source.clone()).mount();

    settle(1).await;
    assert!(grid.read(|s| s.loading()));
    settle(200).await;
    assert!(!grid.read(|s| s.loading()));

    let handle = grid.reload(true);
    settle(1).await;
    assert!(grid.loader().is_fetching());
    assert!(!grid.read(|s| s.loading()));

    handle.await.unwrap().unwrap();
    assert_eq!(grid.read(|s| s.draws_count()), 2);
}

#[tokio::test(start_paused = true)]
async fn row_edits_and_selection_stay_local() {
    let source = Arc::new(MockDataSource::new(people(5)));
    let grid = AsyncGrid::builder(source.clone()).mount();
    settle(1).await;

    let matched = grid.update_row(
        Row::new().with("id", 2).with("name", "renamed"),
        &RowMatcher::key("id"),
        false,
    );
    assert!(matched);
    assert_eq!(grid.read(|s| s.rows()[1].value("name").to_string()), "renamed");
    assert!(!grid.update_row(Row::new().with("id", 99), &RowMatcher::key("id"), false));

    grid.select_row(RowId::Int(2), true);
    grid.update_rows(|rows| rows.into_iter().take(3).collect());
    assert_eq!(grid.read(|s| s.rows().len()), 3);
    assert_eq!(source.request_count(), 1, "local edits never refetch");

    grid.reload(false).await.unwrap().unwrap();
    let state = grid.snapshot();
    assert_eq!(state.rows().len(), 5);
    assert!(state.is_selected(&RowId::Int(2)), "selection survives reloads");

    grid.clear_selection();
    assert!(!grid.read(|s| s.is_selected(&RowId::Int(2))));
}

// ============ Teardown ============

#[tokio::test(start_paused = true)]
async fn auto_reload_polls_silently_until_shutdown() {
    let source = Arc::new(MockDataSource::new(people(20)));
    let registry = PollingRegistry::new();
    let grid = AsyncGrid::builder(source.clone())
        .auto_reload(&registry, "people", Duration::from_secs(1))
        .mount();

    settle(1).await;
    assert_eq!(source.request_count(), 1);
    assert!(registry.is_polling("people"));

    settle(1_000).await;
    assert_eq!(source.request_count(), 2);
    assert_eq!(grid.read(|s| s.draws_count()), 2);

    grid.shutdown();
    assert!(!registry.is_polling("people"));

    settle(5_000).await;
    assert_eq!(source.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn failing_auto_reload_backs_off() {
    let source = Arc::new(MockDataSource::new(people(20)));
    source.set_failing(true);
    let registry = PollingRegistry::new();
    let _grid = AsyncGrid::builder(source.clone())
        .auto_reload(&registry, "people", Duration::from_secs(1))
        .mount();

    settle(1_500).await;
    let status = registry.status("people").unwrap();
    assert_eq!(status.fail_count, 1);
    assert_eq!(status.next_delay, Duration::from_secs(2));

    source.set_failing(false);
    settle(2_000).await;
    let status = registry.status("people").unwrap();
    assert_eq!(status.fail_count, 0);
    assert_eq!(status.next_delay, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn drop_aborts_fetch_and_stops_polling() {
    let source = Arc::new(MockDataSource::new(people(20)).with_delay(Duration::from_secs(1)));
    let registry = PollingRegistry::new();
    let grid = AsyncGrid::builder(source.clone())
        .auto_reload(&registry, "people", Duration::from_millis(500))
        .mount();

    settle(1).await;
    assert!(grid.loader().is_fetching());
    drop(grid);

    assert!(!registry.is_polling("people"));
    settle(5_000).await;
    assert_eq!(source.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn actions_after_shutdown_are_cancelled() {
    let source = Arc::new(MockDataSource::new(people(20)));
    let grid = AsyncGrid::builder(source.clone()).mount();
    settle(1).await;

    grid.shutdown();
    grid.shutdown();

    let result = grid.set_offset(10).await.unwrap();
    assert!(matches!(result, Err(GridError::Cancelled)));
    assert!(matches!(grid.reload(false).await.unwrap(), Err(GridError::Cancelled)));
    assert_eq!(grid.read(|s| s.offset()), 0);
    assert_eq!(source.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn shared_registry_name_collision_suppresses_second_grid() {
    let first_source = Arc::new(MockDataSource::new(people(5)));
    let second_source = Arc::new(MockDataSource::new(people(5)));
    let registry = PollingRegistry::new();

    let _first = AsyncGrid::builder(first_source.clone())
        .auto_reload(&registry, "reload", Duration::from_secs(1))
        .mount();
    let second = AsyncGrid::builder(second_source.clone())
        .auto_reload(&registry, "reload", Duration::from_secs(1))
        .mount();

    settle(1_500).await;
    assert_eq!(first_source.request_count(), 2);
    assert_eq!(second_source.request_count(), 1);

    drop(second);
    assert!(registry.is_polling("reload"), "the loser must not stop the winner");
    settle(1_000).await;
    assert_eq!(first_source.request_count(), 3);
}

// ============ GridLoader ============

#[tokio::test(start_paused = true)]
async fn loader_reload_and_wait_reports_supersession() {
    let source = Arc::new(MockDataSource::new(people(30)).with_delay(Duration::from_millis(100)));
    let state = Arc::new(Mutex::new(AsyncGridState::new(&GridDefaults::new(10))));
    let loader = Arc::new(GridLoader::new(source.clone(), state.clone()));

    let waiting = tokio::spawn({
        let loader = loader.clone();
        async move { loader.reload_and_wait(false).await }
    });
    settle(1).await;

    state.lock().set_offset(10);
    loader.reload(false).await.unwrap().unwrap();

    assert!(matches!(waiting.await.unwrap(), Err(GridError::Cancelled)));
    assert_eq!(ids(state.lock().rows()), range(11, 20));
}

#[tokio::test(start_paused = true)]
async fn loader_shutdown_drops_in_flight_result() {
    let source = Arc::new(MockDataSource::new(people(30)).with_delay(Duration::from_millis(100)));
    let state = Arc::new(Mutex::new(AsyncGridState::default()));
    let loader = GridLoader::new(source.clone(), state.clone());

    let handle = loader.reload(false);
    settle(1).await;
    assert!(state.lock().loading());

    loader.shutdown();
    assert!(!state.lock().loading());
    assert!(handle.await.unwrap_err().is_cancelled());

    settle(500).await;
    assert_eq!(state.lock().draws_count(), 0);
    assert!(state.lock().rows().is_empty());
}
