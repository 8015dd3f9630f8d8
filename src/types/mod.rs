mod expr;
mod operand;

pub use expr::{
    all, and, any, eq, gt, gte, is_in, lt, lte, neq, none, not, not_in, or, CompareOp, Expr,
    QuantOp,
};
pub use operand::{self_ref, Operand};
