use std::fmt;
use std::rc::Rc;

use crate::cell::Cell;
use crate::expr::{ExprError, Operand};
use crate::value::Value;

/// The operator catalogue.
///
/// Every operator folds its operand list left to right. `And`/`Or` stop as
/// soon as the running result is decided and return the deciding operand's
/// value; the comparison operators chain pairwise (`eq(a, b, c)` means
/// `a == b && b == c`) and stop at the first failing pair; the arithmetic
/// operators never stop early. Operands skipped by a short-circuit are not
/// evaluated at all: their probes do not run and their flag reads are not
/// consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
    Not,
    Eq,
    Neq,
    EqStrict,
    NeqStrict,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
}

impl Op {
    pub(crate) fn check_arity(self, len: usize) -> Result<(), ExprError> {
        if len == 0 {
            return Err(ExprError::Empty { op: self });
        }
        match self {
            Op::Not | Op::Neg if len != 1 => Err(ExprError::Unary { op: self, got: len }),
            Op::Eq
            | Op::Neq
            | Op::EqStrict
            | Op::NeqStrict
            | Op::Lt
            | Op::Lte
            | Op::Gt
            | Op::Gte
                if len < 2 =>
            {
                Err(ExprError::Comparison { op: self, got: len })
            }
            _ => Ok(()),
        }
    }

    fn compare_pair(self, a: &Value, b: &Value) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Op::Eq => a.loose_eq(b),
            Op::Neq => !a.loose_eq(b),
            Op::EqStrict => a.strict_eq(b),
            Op::NeqStrict => !a.strict_eq(b),
            Op::Lt => matches!(a.compare(b), Some(Less)),
            Op::Lte => matches!(a.compare(b), Some(Less | Equal)),
            Op::Gt => matches!(a.compare(b), Some(Greater)),
            Op::Gte => matches!(a.compare(b), Some(Greater | Equal)),
            _ => unreachable!("not a comparison operator"),
        }
    }

    fn fold_arith(self, acc: &Value, next: &Value) -> Value {
        match self {
            Op::Add => acc.add(next),
            Op::Sub => acc.sub(next),
            Op::Mul => acc.mul(next),
            Op::Div => acc.div(next),
            Op::Rem => acc.rem(next),
            _ => unreachable!("not an arithmetic operator"),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::EqStrict => "eq_strict",
            Op::NeqStrict => "neq_strict",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Rem => "rem",
            Op::Neg => "neg",
        };
        f.write_str(name)
    }
}

/// An immutable expression tree over cells, literals, probes, and nested
/// sub-trees.
///
/// `Expr` is a cheap clonable handle; the tree behind it is shared, not
/// copied, when the same clause backs several bindings. Build trees with
/// the chain methods of [`crate::ExprOps`] or the free functions in
/// [`crate::ops`].
///
/// # Example
///
/// ```
/// use corollary::{create_cell, ExprOps};
///
/// let a = create_cell(0);
/// let clause = a.rem(100).eq(0);
/// assert!(clause.eval().truthy());
/// a.write(150);
/// assert!(!clause.eval().truthy());
/// ```
#[derive(Clone)]
pub struct Expr {
    inner: Rc<ExprInner>,
}

struct ExprInner {
    op: Op,
    operands: Vec<Operand>,
}

impl Expr {
    /// Checked constructor for dynamically-assembled operand lists.
    ///
    /// Rejects empty lists, non-unary input to `Not`/`Neg`, and comparison
    /// chains with fewer than two operands. This is the only place a
    /// malformed expression can surface; evaluation itself is total.
    pub fn try_build(op: Op, operands: Vec<Operand>) -> Result<Expr, ExprError> {
        op.check_arity(operands.len())?;
        Ok(Expr {
            inner: Rc::new(ExprInner { op, operands }),
        })
    }

    /// Infallible constructor used by the chain methods and free builder
    /// functions. Panics immediately on a malformed operand list.
    pub(crate) fn build(op: Op, operands: Vec<Operand>) -> Expr {
        match Self::try_build(op, operands) {
            Ok(expr) => expr,
            Err(err) => panic!("{err}"),
        }
    }

    /// Wrap a single operand as a standalone clause.
    pub(crate) fn leaf(operand: Operand) -> Expr {
        // A single-operand `or` folds to the operand's own value.
        Expr {
            inner: Rc::new(ExprInner {
                op: Op::Or,
                operands: vec![operand],
            }),
        }
    }

    /// This node's operator.
    pub fn op(&self) -> Op {
        self.inner.op
    }

    /// Evaluate the tree: a strict left-to-right fold with per-operator
    /// short-circuiting (see [`Op`]).
    pub fn eval(&self) -> Value {
        let operands = &self.inner.operands;
        match self.inner.op {
            Op::Not => Value::Bool(!operands[0].eval().truthy()),
            Op::Neg => operands[0].eval().neg(),
            Op::And => {
                let mut acc = operands[0].eval();
                for operand in &operands[1..] {
                    if !acc.truthy() {
                        break;
                    }
                    acc = operand.eval();
                }
                acc
            }
            Op::Or => {
                let mut acc = operands[0].eval();
                for operand in &operands[1..] {
                    if acc.truthy() {
                        break;
                    }
                    acc = operand.eval();
                }
                acc
            }
            Op::Eq
            | Op::Neq
            | Op::EqStrict
            | Op::NeqStrict
            | Op::Lt
            | Op::Lte
            | Op::Gt
            | Op::Gte => {
                let mut prev = operands[0].eval();
                for operand in &operands[1..] {
                    let next = operand.eval();
                    if !self.inner.op.compare_pair(&prev, &next) {
                        return Value::Bool(false);
                    }
                    prev = next;
                }
                Value::Bool(true)
            }
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Rem => {
                let mut acc = operands[0].eval();
                for operand in &operands[1..] {
                    acc = self.inner.op.fold_arith(&acc, &operand.eval());
                }
                acc
            }
        }
    }

    /// Walk the tree once, collecting leaf cells (deduplicated, in
    /// left-to-right order) and whether any flag probe is present.
    pub(crate) fn collect_leaves(&self, leaves: &mut Vec<Cell>, saw_flag_probe: &mut bool) {
        for operand in &self.inner.operands {
            operand.collect_leaves(leaves, saw_flag_probe);
        }
    }
}
