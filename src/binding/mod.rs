//! Bindings: active subscriptions from leaf cells to outcome handlers.
//!
//! A [`Binding`] is created by [`crate::ExprOps::bind`] (clause form) or
//! [`bind_explicit`] (explicit cell list plus free-form test), and torn
//! down by an explicit, idempotent [`Binding::unbind`]. A
//! [`BindingGroup`] aggregates bindings for bulk teardown.

mod binding;
mod group;

pub use binding::{bind_explicit, bind_explicit_else, Binding};
pub(crate) use binding::BindingCore;
pub use group::{create_group, BindingGroup};
