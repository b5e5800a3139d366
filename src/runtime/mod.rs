//! Runtime support for the reactive engine.
//!
//! Currently this is just the identity registry backing subscriber
//! bookkeeping.

mod ids;

pub(crate) use ids::next_id;
