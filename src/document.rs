//! JSON wire form for rule expressions.
//!
//! A rule serializes to a *rule document*: a plain JSON value of shape
//! `{"operator": <name>, "args": [...]}`. Nested expressions serialize as
//! nested documents, literals pass through unchanged, and the self-reference
//! operand maps to the reserved token [`SELF_TOKEN`] (which therefore must
//! not be used as an ordinary string literal).
//!
//! The operator registry is closed and case-sensitive:
//! `and, or, not, eq, ne, gt, gte, lt, lte, in, notIn, any, all, none`.
//! Deserializing a document with any other operator name fails with
//! [`DocumentError::UnknownOperator`].

use serde_json::{json, Value};
use thiserror::Error;

use crate::types::{CompareOp, Expr, Operand, QuantOp};

/// Reserved wire token for the self-reference operand.
pub const SELF_TOKEN: &str = "#$self$#";

/// Errors raised when reconstructing an expression from a rule document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("operator '{operator}' expects {expected} argument(s), got {actual}")]
    Arity {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed rule document: {0}")]
    Malformed(String),
}

fn operator_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::And(_) => "and",
        Expr::Or(_) => "or",
        Expr::Not(_) => "not",
        Expr::Compare { op, .. } => match op {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        },
        Expr::In { .. } => "in",
        Expr::NotIn { .. } => "notIn",
        Expr::Quantify { op, .. } => match op {
            QuantOp::Any => "any",
            QuantOp::All => "all",
            QuantOp::None => "none",
        },
    }
}

fn encode_operand(operand: &Operand) -> Value {
    match operand {
        Operand::Literal(value) => value.clone(),
        Operand::Expr(expr) => encode(expr),
        Operand::SelfRef => Value::String(SELF_TOKEN.to_owned()),
    }
}

pub(crate) fn encode(expr: &Expr) -> Value {
    let args: Vec<Value> = match expr {
        Expr::And(operands) | Expr::Or(operands) => operands.iter().map(encode_operand).collect(),
        Expr::Not(operand) => vec![encode_operand(operand)],
        Expr::Compare { left, right, .. } => vec![encode_operand(left), encode_operand(right)],
        Expr::In { value, list } | Expr::NotIn { value, list } => {
            vec![encode_operand(value), encode_operand(list)]
        }
        Expr::Quantify {
            path, condition, ..
        } => vec![Value::String(path.clone()), encode(condition)],
    };
    json!({ "operator": operator_name(expr), "args": args })
}

fn is_document(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key("operator"))
}

fn decode_operand(arg: &Value) -> Result<Operand, DocumentError> {
    if is_document(arg) {
        return Ok(Operand::Expr(Box::new(decode(arg)?)));
    }
    if matches!(arg, Value::String(s) if s == SELF_TOKEN) {
        return Ok(Operand::SelfRef);
    }
    Ok(Operand::Literal(arg.clone()))
}

fn expect_len(
    operator: &'static str,
    args: &[Value],
    expected: usize,
) -> Result<(), DocumentError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(DocumentError::Arity {
            operator,
            expected,
            actual: args.len(),
        })
    }
}

fn decode_pair(operator: &'static str, args: &[Value]) -> Result<(Operand, Operand), DocumentError> {
    expect_len(operator, args, 2)?;
    Ok((decode_operand(&args[0])?, decode_operand(&args[1])?))
}

fn decode_quantifier(
    operator: &'static str,
    op: QuantOp,
    args: &[Value],
) -> Result<Expr, DocumentError> {
    expect_len(operator, args, 2)?;
    let Value::String(path) = &args[0] else {
        return Err(DocumentError::Malformed(format!(
            "'{operator}' expects a path string as its first argument"
        )));
    };
    if !is_document(&args[1]) {
        return Err(DocumentError::Malformed(format!(
            "'{operator}' expects a rule document as its second argument"
        )));
    }
    Ok(Expr::Quantify {
        op,
        path: path.clone(),
        condition: Box::new(decode(&args[1])?),
    })
}

pub(crate) fn decode(doc: &Value) -> Result<Expr, DocumentError> {
    let Value::Object(map) = doc else {
        return Err(DocumentError::Malformed(
            "a rule document must be a JSON object".to_owned(),
        ));
    };
    let operator = match map.get("operator") {
        Some(Value::String(name)) => name.as_str(),
        Some(_) => {
            return Err(DocumentError::Malformed(
                "'operator' must be a string".to_owned(),
            ))
        }
        None => {
            return Err(DocumentError::Malformed(
                "missing 'operator' key".to_owned(),
            ))
        }
    };
    let args = match map.get("args") {
        Some(Value::Array(args)) => args.as_slice(),
        _ => {
            return Err(DocumentError::Malformed(
                "'args' must be an array".to_owned(),
            ))
        }
    };

    let decode_all = |args: &[Value]| -> Result<Vec<Operand>, DocumentError> {
        args.iter().map(decode_operand).collect()
    };
    let compare = |op: CompareOp, name: &'static str| -> Result<Expr, DocumentError> {
        let (left, right) = decode_pair(name, args)?;
        Ok(Expr::Compare { op, left, right })
    };

    match operator {
        "and" => Ok(Expr::And(decode_all(args)?)),
        "or" => Ok(Expr::Or(decode_all(args)?)),
        "not" => {
            expect_len("not", args, 1)?;
            Ok(Expr::Not(Box::new(decode_operand(&args[0])?)))
        }
        "eq" => compare(CompareOp::Eq, "eq"),
        "ne" => compare(CompareOp::Neq, "ne"),
        "gt" => compare(CompareOp::Gt, "gt"),
        "gte" => compare(CompareOp::Gte, "gte"),
        "lt" => compare(CompareOp::Lt, "lt"),
        "lte" => compare(CompareOp::Lte, "lte"),
        "in" => {
            let (value, list) = decode_pair("in", args)?;
            Ok(Expr::In { value, list })
        }
        "notIn" => {
            let (value, list) = decode_pair("notIn", args)?;
            Ok(Expr::NotIn { value, list })
        }
        "any" => decode_quantifier("any", QuantOp::Any, args),
        "all" => decode_quantifier("all", QuantOp::All, args),
        "none" => decode_quantifier("none", QuantOp::None, args),
        unknown => Err(DocumentError::UnknownOperator(unknown.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all, and, any, eq, gt, is_in, neq, none, not, not_in, or, self_ref};
    use serde_json::json;

    #[test]
    fn encode_comparison() {
        let doc = eq("user.status", "active").to_document();
        assert_eq!(
            doc,
            json!({"operator": "eq", "args": ["user.status", "active"]})
        );
    }

    #[test]
    fn encode_nested_logic() {
        let doc = and([eq("a", 1_i64), gt("b", 2_i64)]).to_document();
        assert_eq!(
            doc,
            json!({
                "operator": "and",
                "args": [
                    {"operator": "eq", "args": ["a", 1]},
                    {"operator": "gt", "args": ["b", 2]},
                ]
            })
        );
    }

    #[test]
    fn encode_self_sentinel_as_token() {
        let doc = any("tags", eq(self_ref(), "rust")).to_document();
        assert_eq!(
            doc,
            json!({
                "operator": "any",
                "args": ["tags", {"operator": "eq", "args": ["#$self$#", "rust"]}]
            })
        );
    }

    #[test]
    fn decode_round_trips_every_operator() {
        let exprs = vec![
            and([eq("a", 1_i64), neq("b", 2_i64)]),
            or([gt("a", 1_i64), not(eq("b", 2_i64))]),
            is_in("user.role", json!(["admin", "ops"])),
            not_in("user.role", json!(["guest"])),
            any("xs", eq(self_ref(), 1_i64)),
            all("xs", gt("n", 0_i64)),
            none("xs", eq("flag", true)),
        ];
        for expr in exprs {
            let doc = expr.to_document();
            let restored = Expr::from_document(&doc).unwrap();
            assert_eq!(restored, expr, "failed for {doc}");
            assert_eq!(restored.to_document(), doc);
        }
    }

    #[test]
    fn decode_token_restores_sentinel() {
        let doc = json!({"operator": "eq", "args": ["#$self$#", "rust"]});
        let expr = Expr::from_document(&doc).unwrap();
        assert_eq!(expr, eq(self_ref(), "rust"));
    }

    #[test]
    fn decode_unknown_operator() {
        let doc = json!({"operator": "bogus", "args": []});
        let err = Expr::from_document(&doc).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownOperator(name) if name == "bogus"));
    }

    #[test]
    fn operator_names_are_case_sensitive() {
        let doc = json!({"operator": "AND", "args": []});
        assert!(matches!(
            Expr::from_document(&doc),
            Err(DocumentError::UnknownOperator(_))
        ));
    }

    #[test]
    fn decode_wrong_arity() {
        let doc = json!({"operator": "eq", "args": ["only one"]});
        let err = Expr::from_document(&doc).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Arity {
                operator: "eq",
                expected: 2,
                actual: 1,
            }
        ));
    }

    #[test]
    fn decode_malformed_shapes() {
        for doc in [
            json!(["not", "an", "object"]),
            json!({"args": []}),
            json!({"operator": 7, "args": []}),
            json!({"operator": "and"}),
            json!({"operator": "and", "args": "nope"}),
            json!({"operator": "any", "args": [7, {"operator": "eq", "args": [1, 1]}]}),
            json!({"operator": "any", "args": ["xs", "not a document"]}),
        ] {
            assert!(
                matches!(Expr::from_document(&doc), Err(DocumentError::Malformed(_))),
                "expected Malformed for {doc}"
            );
        }
    }

    #[test]
    fn literal_object_without_operator_key_stays_literal() {
        let doc = json!({"operator": "eq", "args": [{"plain": "object"}, "x"]});
        let expr = Expr::from_document(&doc).unwrap();
        assert_eq!(expr.to_document(), doc);
        match expr {
            Expr::Compare { left, .. } => {
                assert_eq!(left, Operand::Literal(json!({"plain": "object"})));
            }
            other => panic!("expected Compare, got {other:?}"),
        }
    }

    #[test]
    fn json_string_round_trip() {
        let expr = and([eq("user.status", "active"), gt("user.age", 18_i64)]);
        let text = expr.to_json_string().unwrap();
        let restored = Expr::from_json_str(&text).unwrap();
        assert_eq!(restored, expr);
    }

    #[test]
    fn from_json_str_rejects_invalid_json() {
        assert!(Expr::from_json_str("{not json").is_err());
    }
}
