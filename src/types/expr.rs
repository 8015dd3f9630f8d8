use std::fmt;
use std::ops::Not;

use serde_json::Value;

use super::Operand;

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Array quantifiers: how many elements of the target array must satisfy the
/// child condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantOp {
    /// At least one element matches.
    Any,
    /// Every element matches (vacuously true for an empty array).
    All,
    /// No element matches (vacuously true for an empty array).
    None,
}

/// An executable rule node. Evaluates to a boolean given a context.
///
/// Expressions are immutable after construction and own their operand tree
/// exclusively, so a compiled rule is safe to evaluate repeatedly and
/// concurrently (share it behind `Arc` across threads).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical conjunction over any number of operands, left-to-right with
    /// short-circuit on the first falsy operand.
    And(Vec<Operand>),
    /// Logical disjunction, short-circuiting on the first truthy operand.
    Or(Vec<Operand>),
    /// Logical negation of a single resolved operand.
    Not(Box<Operand>),
    /// Binary comparison of two resolved operands.
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    /// Membership test: the resolved value is present in the literal list.
    In { value: Operand, list: Operand },
    /// Negated membership test.
    NotIn { value: Operand, list: Operand },
    /// Array quantifier: resolve `path` against the context and evaluate
    /// `condition` once per element, with that element as the root context.
    Quantify {
        op: QuantOp,
        path: String,
        condition: Box<Expr>,
    },
}

impl Expr {
    /// Evaluate this rule against a context.
    ///
    /// Never fails: missing paths, type mismatches, and non-array quantifier
    /// targets all degrade to a deterministic boolean.
    #[must_use]
    pub fn evaluate(&self, ctx: &Value) -> bool {
        crate::evaluate::eval_expr(self, ctx)
    }

    /// Append an operand to a conjunction, wrapping `self` in one if needed.
    #[must_use]
    pub fn and(self, other: impl Into<Operand>) -> Expr {
        match self {
            Expr::And(mut operands) => {
                operands.push(other.into());
                Expr::And(operands)
            }
            expr => Expr::And(vec![expr.into(), other.into()]),
        }
    }

    /// Append an operand to a disjunction, wrapping `self` in one if needed.
    #[must_use]
    pub fn or(self, other: impl Into<Operand>) -> Expr {
        match self {
            Expr::Or(mut operands) => {
                operands.push(other.into());
                Expr::Or(operands)
            }
            expr => Expr::Or(vec![expr.into(), other.into()]),
        }
    }

    /// Serialize to the canonical `{"operator": ..., "args": [...]}` document.
    #[must_use]
    pub fn to_document(&self) -> Value {
        crate::document::encode(self)
    }

    /// Reconstruct an expression from a rule document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`](crate::DocumentError) if the document names
    /// an operator absent from the registry or is otherwise malformed.
    pub fn from_document(doc: &Value) -> Result<Expr, crate::DocumentError> {
        crate::document::decode(doc)
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`GavelError`](crate::GavelError) if JSON encoding fails.
    pub fn to_json_string(&self) -> Result<String, crate::GavelError> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// Parse a JSON string and reconstruct the expression it describes.
    ///
    /// # Errors
    ///
    /// Returns [`GavelError`](crate::GavelError) on invalid JSON or a
    /// malformed rule document.
    pub fn from_json_str(input: &str) -> Result<Expr, crate::GavelError> {
        let doc: Value = serde_json::from_str(input)?;
        Ok(Self::from_document(&doc)?)
    }
}

#[cfg(feature = "binary-cache")]
impl Expr {
    /// Serialize this expression to a framed binary blob.
    ///
    /// The blob carries a format version and a truncated BLAKE3 checksum of
    /// the payload; see [`serial`](crate::serial) for the frame layout.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding
    /// fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self)
    }

    /// Deserialize an expression from a blob produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or decode failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(Operand::Expr(Box::new(self))))
    }
}

/// Conjunction over any number of operands.
#[must_use]
pub fn and<I>(operands: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    Expr::And(operands.into_iter().map(Into::into).collect())
}

/// Disjunction over any number of operands.
#[must_use]
pub fn or<I>(operands: I) -> Expr
where
    I: IntoIterator,
    I::Item: Into<Operand>,
{
    Expr::Or(operands.into_iter().map(Into::into).collect())
}

/// Negation of a single operand.
#[must_use]
pub fn not(operand: impl Into<Operand>) -> Expr {
    Expr::Not(Box::new(operand.into()))
}

fn compare(op: CompareOp, left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    Expr::Compare {
        op,
        left: left.into(),
        right: right.into(),
    }
}

/// `left == right` after operand resolution and date normalization.
#[must_use]
pub fn eq(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Eq, left, right)
}

/// `left != right`.
#[must_use]
pub fn neq(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Neq, left, right)
}

/// `left > right`. False when the resolved values are not of the same
/// orderable kind.
#[must_use]
pub fn gt(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Gt, left, right)
}

/// `left >= right`.
#[must_use]
pub fn gte(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Gte, left, right)
}

/// `left < right`.
#[must_use]
pub fn lt(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Lt, left, right)
}

/// `left <= right`.
#[must_use]
pub fn lte(left: impl Into<Operand>, right: impl Into<Operand>) -> Expr {
    compare(CompareOp::Lte, left, right)
}

/// Membership test against a literal array.
#[must_use]
pub fn is_in(value: impl Into<Operand>, list: impl Into<Operand>) -> Expr {
    Expr::In {
        value: value.into(),
        list: list.into(),
    }
}

/// Negated membership test against a literal array.
#[must_use]
pub fn not_in(value: impl Into<Operand>, list: impl Into<Operand>) -> Expr {
    Expr::NotIn {
        value: value.into(),
        list: list.into(),
    }
}

/// At least one element of the array at `path` satisfies `condition`.
#[must_use]
pub fn any(path: impl Into<String>, condition: Expr) -> Expr {
    Expr::Quantify {
        op: QuantOp::Any,
        path: path.into(),
        condition: Box::new(condition),
    }
}

/// Every element of the array at `path` satisfies `condition`.
#[must_use]
pub fn all(path: impl Into<String>, condition: Expr) -> Expr {
    Expr::Quantify {
        op: QuantOp::All,
        path: path.into(),
        condition: Box::new(condition),
    }
}

/// No element of the array at `path` satisfies `condition`.
#[must_use]
pub fn none(path: impl Into<String>, condition: Expr) -> Expr {
    Expr::Quantify {
        op: QuantOp::None,
        path: path.into(),
        condition: Box::new(condition),
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for QuantOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantOp::Any => write!(f, "ANY"),
            QuantOp::All => write!(f, "ALL"),
            QuantOp::None => write!(f, "NONE"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, operands: &[Operand], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{operand}")?;
            }
            write!(f, ")")
        }

        match self {
            Expr::And(operands) => join(f, operands, "AND"),
            Expr::Or(operands) => join(f, operands, "OR"),
            Expr::Not(operand) => write!(f, "(NOT {operand})"),
            Expr::Compare { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::In { value, list } => write!(f, "({value} IN {list})"),
            Expr::NotIn { value, list } => write!(f, "({value} NOT IN {list})"),
            Expr::Quantify {
                op,
                path,
                condition,
            } => write!(f, "({op} \"{path}\" {condition})"),
        }
    }
}
