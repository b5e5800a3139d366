//! # Corollary
//!
//! A reactive state-clause library for Rust.
//!
//! Corollary lets you declare "whenever some state set X holds, do Y" and
//! stop polling for it: bind a clause over observable cells to a pair of
//! handlers, and the engine re-evaluates the clause synchronously whenever
//! any cell it depends on is written.
//!
//! ## Cells (observable values)
//!
//! - [`Cell`] - An observable, optionally bounded value slot
//! - Writes notify subscribed bindings synchronously, in registration order
//! - Transient probes ([`Cell::was_set`], [`Cell::was_changed`],
//!   [`Cell::last`]) expose write/change events to in-flight tests
//!
//! ## Expression trees (state clauses)
//!
//! - [`Expr`] - Immutable, shareable operator trees over cells, literals,
//!   probes, and nested trees
//! - Built with the [`ExprOps`] chain methods or the free functions in
//!   [`ops`]; evaluated as a left-to-right fold with short-circuiting
//!
//! ## Bindings
//!
//! - [`Binding`] - An active subscription firing a positive (and optional
//!   negative) handler under a change/force policy
//! - [`bind_explicit`] - The free-form variant: an explicit cell list plus
//!   an arbitrary test function
//! - [`BindingGroup`] - Bulk teardown convenience
//!
//! ```
//! use corollary::{create_cell, ExprOps};
//!
//! let a = create_cell(0);
//! let b = create_cell("apple");
//!
//! let binding = a.eq(1).and(b.eq("apple")).bind(false, || {
//!     println!("state satisfied!");
//! });
//!
//! a.write(1); // prints
//! binding.unbind();
//! ```
//!
//! Everything is synchronous and single-threaded by design: there is no
//! scheduler, no queue, and no deferred tick, and the handles are
//! deliberately not `Send`.

pub mod binding;
pub mod cell;
pub mod expr;
pub(crate) mod runtime;
pub mod value;

// Re-export main types for convenience
pub use binding::{bind_explicit, bind_explicit_else, create_group, Binding, BindingGroup};
pub use cell::{create_bounded_cell, create_cell, Cell};
pub use expr::{ops, probe, Expr, ExprError, ExprOps, FlagKind, IntoOperand, IntoOperands, Op, Operand};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let cell = create_cell(0);
        assert_eq!(cell.read(), 0.into());
        cell.write(42);
        assert_eq!(cell.read(), 42.into());
    }
}
