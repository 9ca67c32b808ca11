//! Filter/sort pass for in-memory rows
//!
//! [`filter_and_order`] turns the full row set into the derived, ordered
//! result the client grid pages over. It never touches its input.

use std::sync::Arc;

use crate::compare::comparator_for;
use crate::types::{Filters, OrderSpec, Row, Value, ValuesType};

/// Caller-supplied filter: decides which rows survive and in what shape
pub type FilterFn = Arc<dyn Fn(&[Row], &Filters) -> Vec<Row> + Send + Sync>;

/// Caller-supplied ordering: receives the filtered rows and returns them sorted
pub type OrderFn = Arc<dyn Fn(Vec<Row>, &OrderSpec) -> Vec<Row> + Send + Sync>;

/// Produce the filtered and ordered row set.
///
/// - With `filter_fn` the callback fully determines the surviving rows;
///   otherwise every row passes through (cloned).
/// - With `order_fn` the callback fully determines the order; otherwise the
///   default comparator for the column's value type is used.
///
/// The default ordering is a no-op when no column is set, when no row has the
/// column, or when the column's values are not comparable (nested JSON).
pub fn filter_and_order(
    all_rows: &[Row],
    filters: &Filters,
    ordering: &OrderSpec,
    filter_fn: Option<&FilterFn>,
    order_fn: Option<&OrderFn>,
) -> Vec<Row> {
    let rows = match filter_fn {
        Some(filter) => filter(all_rows, filters),
        None => all_rows.to_vec(),
    };

    match order_fn {
        Some(order) => order(rows, ordering),
        None => default_order(rows, ordering),
    }
}

fn default_order(mut rows: Vec<Row>, ordering: &OrderSpec) -> Vec<Row> {
    let Some(column) = ordering.column.as_deref() else {
        return rows;
    };

    let Some(values_type) = ordering
        .values_type
        .or_else(|| infer_values_type(&rows, column))
    else {
        tracing::debug!("Column '{}' has no sortable values, keeping row order", column);
        return rows;
    };

    let compare = comparator_for(values_type);
    let direction = ordering.direction;
    rows.sort_by(|a, b| compare(a.value(column), b.value(column), direction));
    rows
}

/// Value family of the first non-NULL cell in `column`.
///
/// `None` when no row carries a value there, or when the first value found is
/// nested JSON.
fn infer_values_type(rows: &[Row], column: &str) -> Option<ValuesType> {
    rows.iter()
        .filter_map(|row| row.get(column))
        .find(|value| !value.is_null())
        .and_then(ValuesType::of)
}

/// Ready-made case-insensitive "contains" filter.
///
/// Every non-empty filter entry must match. An entry whose key names a column
/// of the row is tested against that cell; any other key (e.g. a free-text
/// `q`) is tested against every cell of the row. Array filter values match
/// when any element matches.
pub fn contains_filter() -> FilterFn {
    Arc::new(|rows: &[Row], filters: &Filters| {
        let needles: Vec<(String, Vec<String>)> = filters
            .without_empty()
            .iter()
            .map(|(key, value)| (key.clone(), needle_texts(value)))
            .collect();

        rows.iter()
            .filter(|row| {
                needles
                    .iter()
                    .all(|(key, texts)| row_matches(row, key, texts))
            })
            .cloned()
            .collect()
    })
}

fn row_matches(row: &Row, key: &str, needles: &[String]) -> bool {
    let cell_matches = |value: &Value| {
        let haystack = value.to_string().to_lowercase();
        needles.iter().any(|needle| haystack.contains(needle.as_str()))
    };

    match row.get(key) {
        Some(value) => cell_matches(value),
        None => row.iter().any(|(_, value)| cell_matches(value)),
    }
}

fn needle_texts(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().flat_map(needle_texts).collect(),
        serde_json::Value::String(s) => vec![s.trim().to_lowercase()],
        other => vec![other.to_string().to_lowercase()],
    }
}
