use gridkit_core::{Filters, SortDirection};
use serde::{Deserialize, Serialize};

/// Token of a grid in its default state
pub const EMPTY_TOKEN: &str = "{}";

/// Compact grid state as stored in the URL.
///
/// Every field is optional and left out when it holds its default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryStateToken {
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<usize>,
    /// Offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub o: Option<usize>,
    /// Sort column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sb: Option<String>,
    /// Sort direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sd: Option<SortDirection>,
    /// Filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f: Option<Filters>,
}

impl QueryStateToken {
    /// Build a token, leaving out every field at its default.
    ///
    /// Filter keys are written in lexical order, so the same filters always
    /// give the same token whatever order they were entered in.
    pub fn from_state(
        limit: usize,
        offset: usize,
        order_by: Option<&str>,
        order_direction: SortDirection,
        filters: &Filters,
        default_limit: usize,
    ) -> Self {
        Self {
            l: (limit != default_limit).then_some(limit),
            o: (offset != 0).then_some(offset),
            sb: order_by.map(str::to_string),
            sd: order_by.map(|_| order_direction),
            f: (!filters.is_empty()).then(|| filters.sorted()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Serialized form, `"{}"` when every field is at its default
    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to encode grid state: {}", e);
                EMPTY_TOKEN.to_string()
            }
        }
    }
}

/// Serialize grid state into a URL token.
///
/// `limit` is left out when it equals `default_limit`, `offset` when zero, the
/// sort fields when there is no sort column and the filters when empty.
pub fn encode(
    limit: usize,
    offset: usize,
    order_by: Option<&str>,
    order_direction: SortDirection,
    filters: &Filters,
    default_limit: usize,
) -> String {
    QueryStateToken::from_state(
        limit,
        offset,
        order_by,
        order_direction,
        filters,
        default_limit,
    )
    .encode()
}

/// Parse a URL token.
///
/// Returns `None` for empty or malformed input. Fields missing from the token
/// stay `None`; filling in defaults is up to the caller.
pub fn decode(token: &str) -> Option<QueryStateToken> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match serde_json::from_str(token) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::debug!("Ignoring malformed grid state token: {}", e);
            None
        }
    }
}
