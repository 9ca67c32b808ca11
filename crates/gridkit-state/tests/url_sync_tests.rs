//! Integration tests for mirroring grid state into a URL

mod common;

use std::sync::Arc;

use gridkit_state::{
    AsyncGrid, Filters, GridDefaults, Location, MemoryLocation, OrderClause, OrderSpec,
    SortDirection,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use url::Url;

use common::{MockDataSource, ids, people, settle};

fn shared_url(query: Option<(&str, &str)>) -> Arc<Mutex<Url>> {
    let mut url = Url::parse("https://app.example/people?tab=all").unwrap();
    if let Some((name, token)) = query {
        url.set_query_param(name, Some(token));
    }
    Arc::new(Mutex::new(url))
}

fn by_id() -> GridDefaults {
    GridDefaults::new(25).with_ordering(OrderSpec::by("id", SortDirection::Asc))
}

#[tokio::test(start_paused = true)]
async fn mount_restores_state_from_url() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let location = shared_url(Some(("state", r#"{"l":10,"o":20}"#)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(by_id())
        .location(location.clone())
        .mount();
    settle(1).await;

    let request = source.last_request().unwrap();
    assert_eq!(request.limit, 10);
    assert_eq!(request.offset, 20);
    assert_eq!(
        request.order,
        vec![OrderClause {
            column: "id".into(),
            direction: SortDirection::Asc,
        }]
    );
    assert_eq!(ids(grid.snapshot().rows()), (21..=30).collect::<Vec<_>>());
    assert!(grid.location_changed().is_none(), "nothing new to read");
}

#[tokio::test(start_paused = true)]
async fn actions_write_url_without_echo() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let location = shared_url(Some(("state", r#"{"l":10,"o":20}"#)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(by_id())
        .location(location.clone())
        .mount();
    settle(1).await;

    grid.set_offset(30).await.unwrap().unwrap();
    assert_eq!(
        grid.location_token().as_deref(),
        Some(r#"{"l":10,"o":30,"sb":"id","sd":"asc"}"#)
    );
    assert_eq!(
        location.lock().query_param("tab").as_deref(),
        Some("all"),
        "other parameters survive"
    );

    assert!(grid.location_changed().is_none(), "own write is not a navigation");
    assert_eq!(source.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn navigation_applies_or_resets_every_field() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let location = shared_url(None);
    let grid = AsyncGrid::builder(source.clone())
        .defaults(by_id())
        .location(location.clone())
        .mount();
    settle(1).await;

    grid.set_limit(10).await.unwrap().unwrap();
    grid.apply_filters(Filters::new().with("city", "oslo"), true)
        .await
        .unwrap()
        .unwrap();
    grid.set_order(OrderSpec::by("name", SortDirection::Desc), false)
        .await
        .unwrap()
        .unwrap();

    // Back button lands on a token that only knows the offset
    location.lock().set_query_param("state", Some(r#"{"o":10}"#));
    grid.location_changed().unwrap().await.unwrap().unwrap();

    let state = grid.snapshot();
    assert_eq!(state.limit(), 25);
    assert_eq!(state.offset(), 10);
    assert_eq!(state.ordering(), &OrderSpec::by("id", SortDirection::Asc));
    assert!(state.filters().is_empty());
    assert_eq!(source.last_request().unwrap().offset, 10);
}

#[tokio::test(start_paused = true)]
async fn unreadable_token_restores_defaults() {
    let source = Arc::new(MockDataSource::new(people(95)));
    let location = shared_url(Some(("state", r#"{"o":40}"#)));
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .location(location.clone())
        .mount();
    settle(1).await;
    assert_eq!(grid.read(|s| s.offset()), 40);

    location.lock().set_query_param("state", Some("{not json"));
    grid.location_changed().unwrap().await.unwrap().unwrap();

    assert_eq!(grid.read(|s| (s.limit(), s.offset())), (10, 0));
    assert_eq!(ids(grid.snapshot().rows()), (1..=10).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn default_state_removes_parameter() {
    let source = Arc::new(MockDataSource::new(people(30)));
    let location = shared_url(None);
    let grid = AsyncGrid::builder(source.clone())
        .defaults(GridDefaults::new(10))
        .location(location.clone())
        .mount();
    settle(1).await;

    grid.go_to_page(3).await.unwrap().unwrap();
    assert_eq!(grid.location_token().as_deref(), Some(r#"{"o":20}"#));

    grid.go_to_page(1).await.unwrap().unwrap();
    assert_eq!(grid.location_token(), None);
    assert_eq!(location.lock().query(), Some("tab=all"));
}

#[tokio::test(start_paused = true)]
async fn grids_share_a_location_under_separate_params() {
    let location = Arc::new(Mutex::new(MemoryLocation::new()));
    let left = AsyncGrid::builder(Arc::new(MockDataSource::new(people(30))))
        .defaults(GridDefaults::new(10))
        .location(location.clone())
        .query_param("left")
        .mount();
    let right = AsyncGrid::builder(Arc::new(MockDataSource::new(people(30))))
        .defaults(GridDefaults::new(10))
        .location(location.clone())
        .query_param("right")
        .mount();
    settle(1).await;

    left.set_offset(10).await.unwrap().unwrap();
    right.toggle_order("name", true).await.unwrap().unwrap();

    let params = location.lock().clone();
    assert_eq!(params.query_param("left").as_deref(), Some(r#"{"o":10}"#));
    assert_eq!(
        params.query_param("right").as_deref(),
        Some(r#"{"sb":"name","sd":"asc"}"#)
    );
    assert_eq!(params.writes(), 2);

    assert!(left.location_changed().is_none());
    assert!(right.location_changed().is_none());
}
