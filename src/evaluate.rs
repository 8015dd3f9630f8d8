use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::compare::{compare, value_eq};
use crate::path;
use crate::types::{Expr, Operand, QuantOp};

/// Evaluate a rule against an optional context.
///
/// The engine entry point. `None` evaluates against an empty object, for
/// rules built purely from literals. Evaluation is total: it raises no errors
/// and absorbs missing paths and type mismatches per operator policy.
///
/// ```
/// use gavel::{and, eq, evaluate, gt};
/// use serde_json::json;
///
/// let rule = and([eq("user.status", "active"), gt("user.age", 18_i64)]);
/// let ctx = json!({"user": {"status": "active", "age": 25}});
/// assert!(evaluate(&rule, Some(&ctx)));
/// assert!(!evaluate(&rule, None));
/// ```
#[must_use]
pub fn evaluate(rule: &Expr, ctx: Option<&Value>) -> bool {
    match ctx {
        Some(ctx) => eval_expr(rule, ctx),
        None => eval_expr(rule, &Value::Object(Map::new())),
    }
}

pub(crate) fn eval_expr(expr: &Expr, ctx: &Value) -> bool {
    match expr {
        Expr::And(operands) => operands.iter().all(|operand| truthy(&resolve(operand, ctx))),
        Expr::Or(operands) => operands.iter().any(|operand| truthy(&resolve(operand, ctx))),
        Expr::Not(operand) => !truthy(&resolve(operand, ctx)),
        Expr::Compare { op, left, right } => {
            compare(&resolve(left, ctx), *op, &resolve(right, ctx))
        }
        Expr::In { value, list } => in_list(value, list, ctx),
        Expr::NotIn { value, list } => !in_list(value, list, ctx),
        Expr::Quantify {
            op,
            path,
            condition,
        } => quantify(*op, path, condition, ctx),
    }
}

/// Resolve an operand to a concrete value.
///
/// The self-reference is the context itself; a nested expression is its
/// boolean result; a string literal is tried as a path and falls back to the
/// literal when the path is absent; every other literal passes through.
fn resolve<'a>(operand: &'a Operand, ctx: &'a Value) -> Cow<'a, Value> {
    match operand {
        Operand::SelfRef => Cow::Borrowed(ctx),
        Operand::Expr(expr) => Cow::Owned(Value::Bool(eval_expr(expr, ctx))),
        Operand::Literal(literal) => {
            if let Value::String(s) = literal {
                if let Some(found) = path::resolve(ctx, s) {
                    return found;
                }
            }
            Cow::Borrowed(literal)
        }
    }
}

/// JS-style truthiness: `null`, `false`, `0`, and `""` are falsy; arrays and
/// objects (empty or not) are truthy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn in_list(value: &Operand, list: &Operand, ctx: &Value) -> bool {
    let Operand::Literal(Value::Array(items)) = list else {
        return false;
    };
    let resolved = resolve(value, ctx);
    items.iter().any(|item| value_eq(&resolved, item))
}

fn quantify(op: QuantOp, path: &str, condition: &Expr, ctx: &Value) -> bool {
    let resolved = path::resolve(ctx, path);
    let elements = match resolved.as_deref() {
        Some(Value::Array(elements)) => elements,
        // Absent or non-array: no element can match.
        _ => {
            return match op {
                QuantOp::Any => false,
                QuantOp::All | QuantOp::None => true,
            }
        }
    };
    match op {
        QuantOp::Any => elements.iter().any(|element| eval_expr(condition, element)),
        QuantOp::All => elements.iter().all(|element| eval_expr(condition, element)),
        QuantOp::None => !elements.iter().any(|element| eval_expr(condition, element)),
    }
}
