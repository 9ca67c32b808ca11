//! Null-safe, direction-aware comparators
//!
//! All comparators share one empty-value policy (see [`compare_empty`]) which runs
//! before any type-specific rule. "Empty" is the falsy test from
//! [`Value::is_empty`], so `0`, `false` and `""` are placed exactly like NULL.

use std::borrow::Cow;
use std::cmp::Ordering;

use unicase::UniCase;

use crate::types::{SortDirection, Value, ValuesType};

/// Signature shared by every comparator in this module
pub type Comparator = fn(&Value, &Value, SortDirection) -> Ordering;

/// Shared empty-value rule.
///
/// Returns `Some` when at least one side is empty:
/// - both empty: `Equal`
/// - ascending: an empty side sorts after a non-empty one
/// - descending: the sign flips, empties come first
///
/// Returns `None` when both sides hold a value and the type-specific rule
/// has to decide.
pub fn compare_empty(a: &Value, b: &Value, direction: SortDirection) -> Option<Ordering> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(direction.apply(Ordering::Greater)),
        (false, true) => Some(direction.apply(Ordering::Less)),
        (false, false) => None,
    }
}

/// Numeric comparison for `Int`, `BigInt` and `Float` values.
///
/// Non-numeric values are coerced to empty first.
pub fn compare_numbers(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    let a = numeric_or_null(a);
    let b = numeric_or_null(b);
    if let Some(ordering) = compare_empty(a, b, direction) {
        return ordering;
    }

    let ordering = match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Float(x), _) => int_cmp_float(as_i128(b), *x).reverse(),
        (_, Value::Float(y)) => int_cmp_float(as_i128(a), *y),
        _ => as_i128(a).cmp(&as_i128(b)),
    };
    direction.apply(ordering)
}

/// 2^127 (`i128::MAX` rounds up to it), the first float magnitude outside `i128`
const I128_LIMIT: f64 = i128::MAX as f64;

/// Exact integer/float ordering. Going through `f64` would round large
/// integers and break transitivity.
fn int_cmp_float(int: i128, float: f64) -> Ordering {
    if float.is_nan() {
        return Ordering::Equal;
    }
    if float >= I128_LIMIT {
        return Ordering::Less;
    }
    if float < -I128_LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    int.cmp(&(whole as i128))
        .then_with(|| whole.partial_cmp(&float).unwrap_or(Ordering::Equal))
}

/// Boolean comparison: `true` is placed before `false` when ascending.
///
/// Non-boolean values are coerced to empty. Since `false` itself is empty,
/// in practice the empty-value rule does the placing.
pub fn compare_booleans(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    let a = bool_or_null(a);
    let b = bool_or_null(b);
    if let Some(ordering) = compare_empty(a, b, direction) {
        return ordering;
    }

    let (x, y) = (a.as_bool().unwrap_or(false), b.as_bool().unwrap_or(false));
    direction.apply(y.cmp(&x))
}

/// Case-insensitive string comparison with a code-point tie-break.
///
/// Non-string values are compared by their display text.
pub fn compare_strings(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    if let Some(ordering) = compare_empty(a, b, direction) {
        return ordering;
    }

    let (x, y) = (display_text(a), display_text(b));
    let (x, y) = match direction {
        SortDirection::Asc => (x, y),
        SortDirection::Desc => (y, x),
    };
    UniCase::new(x.as_ref())
        .cmp(&UniCase::new(y.as_ref()))
        .then_with(|| x.cmp(&y))
}

/// Pick the comparator for a value family
pub fn comparator_for(values_type: ValuesType) -> Comparator {
    match values_type {
        ValuesType::Number => compare_numbers,
        ValuesType::Boolean => compare_booleans,
        ValuesType::String => compare_strings,
    }
}

static NULL: Value = Value::Null;

fn numeric_or_null(value: &Value) -> &Value {
    if value.is_number() { value } else { &NULL }
}

fn bool_or_null(value: &Value) -> &Value {
    if matches!(value, Value::Bool(_)) { value } else { &NULL }
}

fn as_i128(value: &Value) -> i128 {
    match value {
        Value::Int(v) => *v as i128,
        Value::BigInt(v) => *v,
        _ => 0,
    }
}

fn display_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
