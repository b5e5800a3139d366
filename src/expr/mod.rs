//! Composable, short-circuiting expression trees.
//!
//! An [`Expr`] is an immutable operator tree over cells, literals, probes,
//! and nested sub-trees, evaluated as a strict left-to-right fold with
//! per-operator short-circuiting. Trees are shared, never copied, across
//! the bindings that watch them.

mod error;
mod expr;
mod operand;
pub mod ops;

pub use error::ExprError;
pub use expr::{Expr, Op};
pub use operand::{probe, FlagKind, IntoOperand, IntoOperands, Operand};
pub use ops::ExprOps;
