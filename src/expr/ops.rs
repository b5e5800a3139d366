//! Operator builders: the [`ExprOps`] chain methods implemented by both
//! [`Cell`] and [`Expr`], and one free function per operator for building
//! from a plain operand list.

use std::rc::Rc;

use crate::binding::Binding;
use crate::cell::Cell;
use crate::expr::{Expr, FlagKind, IntoOperand, IntoOperands, Op, Operand};

fn chain<T: ExprOps>(op: Op, receiver: &T, rest: impl IntoOperands) -> Expr {
    let mut operands = vec![receiver.clone().into_operand()];
    rest.append_operands(&mut operands);
    Expr::build(op, operands)
}

/// Expression-building capability, implemented by every node that can act
/// as the receiver of an operator chain: cells and expression trees.
///
/// All operators accept a variadic operand list: cells, literals, probes,
/// nested trees, and `Vec`/array/tuple groups thereof, flattened in order.
/// Malformed lists (see [`crate::ExprError`]) panic at construction.
///
/// # Example
///
/// ```
/// use corollary::{create_cell, ExprOps};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = create_cell(0);
/// let b = create_cell("apple");
/// let hits = Rc::new(Cell::new(0));
///
/// let binding = {
///     let hits = Rc::clone(&hits);
///     a.eq(1)
///         .and(b.eq("apple"))
///         .bind(false, move || hits.set(hits.get() + 1))
/// };
///
/// a.write(1); // clause satisfied
/// assert_eq!(hits.get(), 1);
/// binding.unbind();
/// ```
pub trait ExprOps: Clone + IntoOperand {
    /// Wrap this node as a standalone clause.
    fn to_expr(&self) -> Expr;

    /// Logical `&&` across the receiver and `rest`; stops at the first
    /// falsy running result.
    fn and(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::And, self, rest)
    }

    /// Logical `||`; stops at the first truthy running result.
    fn or(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Or, self, rest)
    }

    /// Logical `!` (unary).
    fn not(&self) -> Expr {
        Expr::build(Op::Not, vec![self.clone().into_operand()])
    }

    /// Loose `==`, chained pairwise across consecutive operands.
    fn eq(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Eq, self, rest)
    }

    /// Loose `!=`, chained pairwise.
    fn neq(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Neq, self, rest)
    }

    /// Strict `===` (same kind, equal payload), chained pairwise.
    fn eq_strict(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::EqStrict, self, rest)
    }

    /// Strict `!==`, chained pairwise.
    fn neq_strict(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::NeqStrict, self, rest)
    }

    /// `<`, chained pairwise.
    fn lt(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Lt, self, rest)
    }

    /// `<=`, chained pairwise.
    fn lte(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Lte, self, rest)
    }

    /// `>`, chained pairwise.
    fn gt(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Gt, self, rest)
    }

    /// `>=`, chained pairwise.
    fn gte(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Gte, self, rest)
    }

    /// `+` left fold (string concatenation when either side is a string).
    fn add(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Add, self, rest)
    }

    /// `-` left fold.
    fn sub(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Sub, self, rest)
    }

    /// `*` left fold.
    fn mul(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Mul, self, rest)
    }

    /// `/` left fold.
    fn div(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Div, self, rest)
    }

    /// `%` left fold.
    fn rem(&self, rest: impl IntoOperands) -> Expr {
        chain(Op::Rem, self, rest)
    }

    /// Numeric negation (unary).
    fn neg(&self) -> Expr {
        Expr::build(Op::Neg, vec![self.clone().into_operand()])
    }

    /// Bind this clause to a handler fired when it evaluates truthy.
    ///
    /// Walks the tree once, collects its leaf cells, and subscribes to each
    /// of them. With `force = false` the handler fires only when the
    /// boolean result differs from the previous test's; with `force = true`
    /// it fires on every test pass. A clause containing a flag probe
    /// ([`Cell::set`] / [`Cell::changed`]) is promoted to forced mode
    /// regardless, since the flag is a one-shot event rather than a state.
    fn bind(&self, force: bool, on_true: impl Fn() + 'static) -> Binding {
        Binding::from_clause(self.to_expr(), force, Rc::new(on_true), None)
    }

    /// Like [`ExprOps::bind`], with a second handler fired when the clause
    /// evaluates falsy.
    fn bind_else(
        &self,
        force: bool,
        on_true: impl Fn() + 'static,
        on_false: impl Fn() + 'static,
    ) -> Binding {
        Binding::from_clause(
            self.to_expr(),
            force,
            Rc::new(on_true),
            Some(Rc::new(on_false)),
        )
    }
}

impl ExprOps for Expr {
    fn to_expr(&self) -> Expr {
        self.clone()
    }
}

impl ExprOps for Cell {
    fn to_expr(&self) -> Expr {
        Expr::leaf(Operand::Cell(self.clone()))
    }
}

impl Cell {
    /// Probe node reporting whether this cell was written during the
    /// in-flight notification. A binding whose clause contains this node is
    /// promoted to forced re-fire mode.
    pub fn set(&self) -> Expr {
        Expr::leaf(Operand::FlagProbe {
            cell: self.clone(),
            kind: FlagKind::Set,
        })
    }

    /// Probe node reporting whether the in-flight write changed this
    /// cell's value. Promotes the owning binding to forced mode.
    pub fn changed(&self) -> Expr {
        Expr::leaf(Operand::FlagProbe {
            cell: self.clone(),
            kind: FlagKind::Changed,
        })
    }
}

macro_rules! free_builder {
    ($($(#[$doc:meta])* $name:ident => $op:expr),+ $(,)?) => {$(
        $(#[$doc])*
        pub fn $name(operands: impl IntoOperands) -> Expr {
            let mut list = Vec::new();
            operands.append_operands(&mut list);
            Expr::build($op, list)
        }
    )+};
}

free_builder! {
    /// Logical `&&` over an operand list.
    and => Op::And,
    /// Logical `||` over an operand list.
    or => Op::Or,
    /// Loose `==` chained pairwise over an operand list.
    eq => Op::Eq,
    /// Loose `!=` chained pairwise.
    neq => Op::Neq,
    /// Strict `===` chained pairwise.
    eq_strict => Op::EqStrict,
    /// Strict `!==` chained pairwise.
    neq_strict => Op::NeqStrict,
    /// `<` chained pairwise.
    lt => Op::Lt,
    /// `<=` chained pairwise.
    lte => Op::Lte,
    /// `>` chained pairwise.
    gt => Op::Gt,
    /// `>=` chained pairwise.
    gte => Op::Gte,
    /// `+` left fold.
    add => Op::Add,
    /// `-` left fold.
    sub => Op::Sub,
    /// `*` left fold.
    mul => Op::Mul,
    /// `/` left fold.
    div => Op::Div,
    /// `%` left fold.
    rem => Op::Rem,
}

/// Logical `!` over a single operand.
pub fn not(operand: impl IntoOperand) -> Expr {
    Expr::build(Op::Not, vec![operand.into_operand()])
}

/// Numeric negation of a single operand.
pub fn neg(operand: impl IntoOperand) -> Expr {
    Expr::build(Op::Neg, vec![operand.into_operand()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::create_cell;

    #[test]
    fn free_builders_match_chain_methods() {
        let a = create_cell(true);
        let b = create_cell(false);
        assert_eq!(
            and((&a, &b)).eval().truthy(),
            a.and(&b).eval().truthy()
        );
        assert_eq!(or((&a, &b)).eval(), a.or(&b).eval());
        assert!(not(&b).eval().truthy());
        assert_eq!(neg(3).eval(), (-3).into());
    }

    #[test]
    fn cell_binds_directly_as_a_clause() {
        use std::cell::Cell as Counter;
        use std::rc::Rc;

        let a = create_cell(false);
        let hits = Rc::new(Counter::new(0));
        let binding = {
            let hits = Rc::clone(&hits);
            a.bind(false, move || hits.set(hits.get() + 1))
        };
        a.write(true);
        assert_eq!(hits.get(), 1);
        binding.unbind();
    }
}
