//! Dynamic values flowing through cells and expression trees.

mod value;

pub use value::Value;
