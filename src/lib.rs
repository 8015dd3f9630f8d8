mod compare;
mod document;
mod error;
mod evaluate;
mod path;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use compare::compare;
pub use document::{DocumentError, SELF_TOKEN};
pub use error::GavelError;
pub use evaluate::evaluate;
pub use path::resolve;
pub use types::{
    all, and, any, eq, gt, gte, is_in, lt, lte, neq, none, not, not_in, or, self_ref, CompareOp,
    Expr, Operand, QuantOp,
};
