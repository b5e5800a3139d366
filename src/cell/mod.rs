//! Observable value cells.
//!
//! A [`Cell`] is a single mutable value slot, optionally bounded, that
//! synchronously re-tests every binding subscribed to it when written.

mod cell;

pub use cell::{create_bounded_cell, create_cell, Cell};
