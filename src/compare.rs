//! Type-aware comparison of resolved JSON values.
//!
//! Comparison is lenient by design: it returns a boolean for every input and
//! never fails. Values that are both date-like (ISO-formatted strings or
//! strictly positive epoch-millisecond numbers) are normalized to instants
//! before comparing, so mixed representations of the same moment compare
//! chronologically. Ordering between values of different kinds, or of kinds
//! with no order, is `false`.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::types::CompareOp;

/// Compare two resolved values using the given operator.
///
/// ```
/// use gavel::{compare, CompareOp};
/// use serde_json::json;
///
/// // Mixed date representations compare chronologically.
/// assert!(compare(
///     &json!("2023-01-16T00:00:00Z"),
///     CompareOp::Gt,
///     &json!(1_673_740_800_000_i64),
/// ));
/// // Non-date strings compare lexically.
/// assert!(!compare(&json!("apple"), CompareOp::Gt, &json!("banana")));
/// // Mismatched kinds never order.
/// assert!(!compare(&json!(1), CompareOp::Lt, &json!("2")));
/// ```
#[must_use]
pub fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (as_instant(left), as_instant(right)) {
        return ord_matches(op, l.cmp(&r));
    }

    match op {
        CompareOp::Eq => value_eq(left, right),
        CompareOp::Neq => !value_eq(left, right),
        CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => match (left, right) {
            (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).is_some_and(|ord| ord_matches(op, ord)),
                _ => false,
            },
            (Value::String(l), Value::String(r)) => ord_matches(op, l.as_str().cmp(r)),
            _ => false,
        },
    }
}

fn ord_matches(op: CompareOp, ord: Ordering) -> bool {
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Neq => ord != Ordering::Equal,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Gte => ord != Ordering::Less,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Lte => ord != Ordering::Greater,
    }
}

/// Value equality with cross-representation numeric comparison (1 == 1.0)
/// applied recursively through arrays and objects.
#[must_use]
pub(crate) fn value_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => number_eq(l, r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| value_eq(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| value_eq(a, b)))
        }
        _ => left == right,
    }
}

fn number_eq(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a == b;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Normalize a date-like value to epoch milliseconds.
///
/// Date-like values are ISO `YYYY-MM-DD` strings (optionally followed by
/// `THH:MM:SS`, fractional seconds, and a zone designator) that parse to a
/// valid instant, and strictly positive numbers that are valid
/// epoch-millisecond timestamps. Everything else is `None`.
fn as_instant(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_iso_instant(s),
        Value::Number(n) => number_instant(n),
        _ => None,
    }
}

fn parse_iso_instant(s: &str) -> Option<i64> {
    if !has_iso_date_shape(s) {
        return None;
    }
    if s.len() == 10 {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    // Zone-less date-times are taken as UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Cheap shape gate so that ordinary strings never reach the date parsers:
/// `DDDD-DD-DD` and either nothing or a `T` separator after it.
fn has_iso_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 10 {
        return false;
    }
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    digits(0..4)
        && b[4] == b'-'
        && digits(5..7)
        && b[7] == b'-'
        && digits(8..10)
        && (b.len() == 10 || b[10] == b'T')
}

fn number_instant(n: &Number) -> Option<i64> {
    let millis = if let Some(i) = n.as_i64() {
        i
    } else if let Some(u) = n.as_u64() {
        i64::try_from(u).ok()?
    } else {
        let f = n.as_f64()?;
        if !f.is_finite() {
            return None;
        }
        f as i64
    };
    if millis <= 0 {
        return None;
    }
    // Reject timestamps outside chrono's representable range.
    DateTime::from_timestamp_millis(millis).map(|_| millis)
}
