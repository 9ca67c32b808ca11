//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gridkit_core::{OrderSpec, contains_filter, filter_and_order};
use gridkit_state::{DataSource, FetchRequest, FetchResponse, GridError, GridResult, Row};

/// In-memory data source for exercising grids without a server.
///
/// Filters rows with a case-insensitive "contains" match, sorts by the first
/// order clause, then slices `offset..offset+limit`. Every request is logged.
pub struct MockDataSource {
    pub rows: Vec<Row>,
    pub should_fail: Arc<AtomicBool>,
    /// Response delay applied to every request
    pub delay: Duration,
    /// Response delay for requests at a specific offset
    pub delays_by_offset: HashMap<usize, Duration>,
    /// Log of all requests received, for assertions in tests
    pub request_log: Arc<parking_lot::Mutex<Vec<FetchRequest>>>,
}

impl MockDataSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            should_fail: Arc::new(AtomicBool::new(false)),
            delay: Duration::ZERO,
            delays_by_offset: HashMap::new(),
            request_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_for_offset(mut self, offset: usize, delay: Duration) -> Self {
        self.delays_by_offset.insert(offset, delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.request_log.lock().len()
    }

    pub fn request_log(&self) -> Vec<FetchRequest> {
        self.request_log.lock().clone()
    }

    pub fn last_request(&self) -> Option<FetchRequest> {
        self.request_log.lock().last().cloned()
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch(&self, request: FetchRequest) -> GridResult<FetchResponse> {
        self.request_log.lock().push(request.clone());

        let delay = self
            .delays_by_offset
            .get(&request.offset)
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(GridError::fetch("server unavailable"));
        }

        let ordering = request
            .order
            .first()
            .map(|clause| OrderSpec::by(clause.column.clone(), clause.direction))
            .unwrap_or_default();
        let matched = filter_and_order(
            &self.rows,
            &request.filters,
            &ordering,
            Some(&contains_filter()),
            None,
        );

        let records = matched
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect();
        Ok(FetchResponse::new(records, matched.len() as u64))
    }
}

/// `count` rows with ids `1..=count`, a name and a city
pub fn people(count: i64) -> Vec<Row> {
    const CITIES: [&str; 3] = ["Oslo", "Bergen", "Tromso"];
    (1..=count)
        .map(|id| {
            Row::new()
                .with("id", id)
                .with("name", format!("person {id:03}"))
                .with("city", CITIES[(id as usize) % CITIES.len()])
        })
        .collect()
}

pub fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter().filter_map(|r| r.value("id").as_i64()).collect()
}

/// Let spawned fetches run. Time is paused in these tests, so sleeping
/// advances the clock only once every ready task has run.
pub async fn settle(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
