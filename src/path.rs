//! Dotted-path resolution over nested JSON values.
//!
//! A path is a `.`-separated string. Each segment names an object key; on an
//! array, a numeric segment addresses an index and `*` projects over all
//! elements. Resolution of a missing segment yields `None` ("undefined"),
//! which is distinct from a present JSON `null`.

use std::borrow::Cow;

use serde_json::Value;

/// Resolve a dotted path against a context value.
///
/// Returns `None` when any segment is missing, when a non-container is
/// descended into, or when a `*` segment lands on a non-array. Plain descent
/// borrows from the context; wildcard projection assembles a new array:
///
/// ```
/// use gavel::resolve;
/// use serde_json::json;
///
/// let ctx = json!({"users": [{"name": "ada"}, {"name": "bob"}]});
/// assert_eq!(
///     resolve(&ctx, "users.*.name").unwrap().into_owned(),
///     json!(["ada", "bob"]),
/// );
/// assert_eq!(resolve(&ctx, "users.0.name").unwrap().as_ref(), &json!("ada"));
/// assert!(resolve(&ctx, "users.0.email").is_none());
/// ```
#[must_use]
pub fn resolve<'a>(ctx: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(ctx, &segments)
}

fn resolve_segments<'a>(value: &'a Value, segments: &[&str]) -> Option<Cow<'a, Value>> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(Cow::Borrowed(value));
    };

    if *segment == "*" {
        let Value::Array(elements) = value else {
            return None;
        };
        // A trailing wildcard yields the array itself.
        if rest.is_empty() {
            return Some(Cow::Borrowed(value));
        }
        let results: Vec<Value> = elements
            .iter()
            .filter_map(|element| resolve_segments(element, rest))
            .map(Cow::into_owned)
            .collect();
        // Nested wildcards produce per-element arrays; flatten one level so
        // `a.*.b.*.c` reads as a single projection.
        let projected = if results.iter().any(Value::is_array) {
            results
                .into_iter()
                .flat_map(|result| match result {
                    Value::Array(items) => items,
                    other => vec![other],
                })
                .collect()
        } else {
            results
        };
        return Some(Cow::Owned(Value::Array(projected)));
    }

    let next = match value {
        Value::Object(map) => map.get(*segment)?,
        Value::Array(elements) => elements.get(segment.parse::<usize>().ok()?)?,
        _ => return None,
    };
    resolve_segments(next, rest)
}
