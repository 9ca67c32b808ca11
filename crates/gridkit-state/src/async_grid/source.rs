//! Remote page fetching contract

use std::future::Future;

use async_trait::async_trait;
use gridkit_core::{Filters, GridResult, Row, SortDirection};
use serde::{Deserialize, Serialize};

/// One sort clause sent to the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClause {
    pub column: String,
    pub direction: SortDirection,
}

/// Parameters of one page fetch.
///
/// `filters` never carries empty values (null, blank strings, empty arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub limit: usize,
    pub offset: usize,
    pub order: Vec<OrderClause>,
    pub filters: Filters,
}

/// One page of results and the size of the full (filtered) result set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub records: Vec<Row>,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<serde_json::Value>,
}

impl FetchResponse {
    pub fn new(records: Vec<Row>, count: u64) -> Self {
        Self {
            records,
            count,
            permissions: None,
        }
    }

    pub fn with_permissions(mut self, permissions: serde_json::Value) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Where an [`AsyncGrid`](super::AsyncGrid) gets its pages from.
///
/// Implementations wrap whatever transport the host uses (HTTP, IPC, a
/// database). A returned error surfaces as `loading_error` on the grid.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> GridResult<FetchResponse>;
}

/// Adapter turning an async function into a [`DataSource`]
pub struct FnSource<F>(F);

/// Wrap an async request function as a [`DataSource`].
///
/// ```ignore
/// let source = source_fn(|request| async move { client.post("/orders", &request).await });
/// ```
pub fn source_fn<F, Fut>(f: F) -> FnSource<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GridResult<FetchResponse>> + Send + 'static,
{
    FnSource(f)
}

#[async_trait]
impl<F, Fut> DataSource for FnSource<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GridResult<FetchResponse>> + Send + 'static,
{
    async fn fetch(&self, request: FetchRequest) -> GridResult<FetchResponse> {
        (self.0)(request).await
    }
}
