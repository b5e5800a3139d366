use std::rc::Rc;

use crate::cell::Cell;
use crate::expr::Expr;
use crate::value::Value;

/// A single position in an operator's operand list.
///
/// This is the tagged union behind every expression tree: a constant, a
/// cell reference, an ephemeral probe function, a transient-flag probe, or
/// a nested sub-tree. Cell references and flag probes contribute leaf
/// dependencies when a binding walks the tree; literals and free probes
/// contribute none.
#[derive(Clone)]
pub enum Operand {
    /// A constant value.
    Literal(Value),
    /// A cell reference, read at evaluation time.
    Cell(Cell),
    /// A zero-dependency function re-invoked on every evaluation pass.
    Probe(Rc<dyn Fn() -> Value>),
    /// A cell's transient write/change flag, read at test time.
    FlagProbe { cell: Cell, kind: FlagKind },
    /// A nested sub-tree.
    Nested(Expr),
}

/// Which transient flag a [`Operand::FlagProbe`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagKind {
    /// The cell was written during the in-flight notification.
    Set,
    /// The in-flight write changed the cell's value.
    Changed,
}

impl Operand {
    pub(crate) fn eval(&self) -> Value {
        match self {
            Operand::Literal(value) => value.clone(),
            Operand::Cell(cell) => cell.read(),
            Operand::Probe(f) => f(),
            Operand::FlagProbe { cell, kind } => Value::Bool(match kind {
                FlagKind::Set => cell.was_set(),
                FlagKind::Changed => cell.was_changed(),
            }),
            Operand::Nested(expr) => expr.eval(),
        }
    }

    /// Dependency walk: collect every reachable cell (deduplicated by
    /// registry key, order preserved) and report whether a flag probe was
    /// seen anywhere in the tree.
    pub(crate) fn collect_leaves(&self, leaves: &mut Vec<Cell>, saw_flag_probe: &mut bool) {
        match self {
            Operand::Cell(cell) => push_unique(leaves, cell),
            Operand::FlagProbe { cell, .. } => {
                *saw_flag_probe = true;
                push_unique(leaves, cell);
            }
            Operand::Nested(expr) => expr.collect_leaves(leaves, saw_flag_probe),
            Operand::Literal(_) | Operand::Probe(_) => {}
        }
    }
}

pub(crate) fn push_unique(leaves: &mut Vec<Cell>, cell: &Cell) {
    if !leaves.iter().any(|c| c.id() == cell.id()) {
        leaves.push(cell.clone());
    }
}

/// Build a free probe operand: a zero-argument function re-invoked on
/// every evaluation pass, contributing no leaf dependency.
///
/// A probe runs under the owning binding's re-entrancy guard, so a probe
/// that writes back into the graph cannot recurse into its own binding.
///
/// ```
/// use corollary::{create_cell, probe, ExprOps};
///
/// let a = create_cell(false);
/// let clause = a.or(probe(|| true));
/// assert!(clause.eval().truthy());
/// ```
pub fn probe<V: Into<Value>>(f: impl Fn() -> V + 'static) -> Operand {
    Operand::Probe(Rc::new(move || f().into()))
}

/// Conversion of a single position into an [`Operand`].
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

impl IntoOperand for Cell {
    fn into_operand(self) -> Operand {
        Operand::Cell(self)
    }
}

impl IntoOperand for &Cell {
    fn into_operand(self) -> Operand {
        Operand::Cell(self.clone())
    }
}

impl IntoOperand for Expr {
    fn into_operand(self) -> Operand {
        Operand::Nested(self)
    }
}

impl IntoOperand for &Expr {
    fn into_operand(self) -> Operand {
        Operand::Nested(self.clone())
    }
}

impl IntoOperand for Value {
    fn into_operand(self) -> Operand {
        Operand::Literal(self)
    }
}

macro_rules! literal_into_operand {
    ($($t:ty),+ $(,)?) => {$(
        impl IntoOperand for $t {
            fn into_operand(self) -> Operand {
                Operand::Literal(self.into())
            }
        }
    )+};
}

literal_into_operand!(bool, i32, i64, u32, f32, f64, &str, String);

/// Conversion of a variadic operand list into a flat `Vec<Operand>`.
///
/// Implemented for single operands, tuples (mixed kinds), and `Vec`s and
/// arrays (nested groups). Nesting flattens recursively, preserving
/// left-to-right order.
pub trait IntoOperands {
    fn append_operands(self, out: &mut Vec<Operand>);
}

macro_rules! single_into_operands {
    ($($t:ty),+ $(,)?) => {$(
        impl IntoOperands for $t {
            fn append_operands(self, out: &mut Vec<Operand>) {
                out.push(self.into_operand());
            }
        }
    )+};
}

single_into_operands!(
    Operand, Cell, &Cell, Expr, &Expr, Value, bool, i32, i64, u32, f32, f64, &str, String
);

impl<T: IntoOperands> IntoOperands for Vec<T> {
    fn append_operands(self, out: &mut Vec<Operand>) {
        for item in self {
            item.append_operands(out);
        }
    }
}

impl<T: IntoOperands, const N: usize> IntoOperands for [T; N] {
    fn append_operands(self, out: &mut Vec<Operand>) {
        for item in self {
            item.append_operands(out);
        }
    }
}

macro_rules! tuple_into_operands {
    ($($name:ident)+) => {
        impl<$($name: IntoOperands),+> IntoOperands for ($($name,)+) {
            fn append_operands(self, out: &mut Vec<Operand>) {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                $($name.append_operands(out);)+
            }
        }
    };
}

tuple_into_operands!(A);
tuple_into_operands!(A B);
tuple_into_operands!(A B C);
tuple_into_operands!(A B C D);
tuple_into_operands!(A B C D E);
tuple_into_operands!(A B C D E F);
tuple_into_operands!(A B C D E F G);
tuple_into_operands!(A B C D E F G H);
tuple_into_operands!(A B C D E F G H I);
tuple_into_operands!(A B C D E F G H I J);
tuple_into_operands!(A B C D E F G H I J K);
tuple_into_operands!(A B C D E F G H I J K L);
