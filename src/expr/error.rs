use thiserror::Error;

use crate::expr::Op;

/// Construction-time expression failures.
///
/// Malformed trees are rejected when the expression is built, never at
/// evaluation time. The checked constructor is [`crate::Expr::try_build`];
/// the chain methods and free builder functions panic immediately with the
/// same message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("`{op}` expression built with no operands")]
    Empty { op: Op },

    #[error("unary `{op}` takes exactly one operand, got {got}")]
    Unary { op: Op, got: usize },

    #[error("`{op}` comparison chain needs at least two operands, got {got}")]
    Comparison { op: Op, got: usize },
}
