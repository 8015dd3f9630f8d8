use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::Expr;

/// A single argument to an operator node.
///
/// String literals double as path expressions: at evaluation time a string is
/// first tried as a dotted path against the context and falls back to the
/// literal string when the path is absent. The self-reference variant stands
/// for "the current context itself" and has no in-band JSON value; the wire
/// codec maps it to a reserved token.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal JSON value (scalar, array, or object).
    Literal(Value),
    /// A nested expression, resolved to its boolean result.
    Expr(Box<Expr>),
    /// The current evaluation context.
    SelfRef,
}

/// The operand denoting the current evaluation context.
///
/// Used by array quantifiers over primitive arrays, where each element is the
/// whole context for the child condition:
///
/// ```
/// use gavel::{any, eq, self_ref};
/// use serde_json::json;
///
/// let rule = any("tags", eq(self_ref(), "rust"));
/// assert!(rule.evaluate(&json!({"tags": ["go", "rust"]})));
/// ```
#[must_use]
pub fn self_ref() -> Operand {
    Operand::SelfRef
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Operand::Expr(Box::new(expr))
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Literal(Value::from(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Literal(Value::from(v))
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Literal(Value::Bool(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Literal(Value::String(v.to_owned()))
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Literal(Value::String(v))
    }
}

impl From<DateTime<Utc>> for Operand {
    fn from(v: DateTime<Utc>) -> Self {
        Operand::Literal(Value::String(
            v.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{v}"),
            Operand::Expr(e) => write!(f, "{e}"),
            Operand::SelfRef => write!(f, "self"),
        }
    }
}
