use std::cell::RefCell;

use crate::binding::Binding;

/// A convenience container aggregating bindings for bulk teardown.
///
/// Purely an aggregation: insertion and removal never change a member's
/// bound state, and the group adds no semantics beyond
/// [`BindingGroup::unbind_all`]. Dropping the group does not unbind its
/// members.
///
/// # Example
///
/// ```
/// use corollary::{create_cell, create_group, ExprOps};
///
/// let a = create_cell(false);
/// let group = create_group();
/// group.insert(a.bind(false, || {}));
/// group.insert(a.not().bind(false, || {}));
/// assert_eq!(group.len(), 2);
/// group.unbind_all();
/// assert!(group.is_empty());
/// ```
#[derive(Default)]
pub struct BindingGroup {
    members: RefCell<Vec<Binding>>,
}

impl BindingGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding; duplicates (by registry key) are ignored.
    pub fn insert(&self, binding: Binding) {
        let mut members = self.members.borrow_mut();
        if members.iter().any(|b| b.id() == binding.id()) {
            return;
        }
        members.push(binding);
    }

    /// Remove a binding from the group without unbinding it.
    pub fn remove(&self, binding: &Binding) {
        self.members.borrow_mut().retain(|b| b.id() != binding.id());
    }

    /// Unbind every member and empty the group.
    pub fn unbind_all(&self) {
        let drained: Vec<Binding> = self.members.borrow_mut().drain(..).collect();
        for binding in drained {
            binding.unbind();
        }
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }
}

/// Create an empty binding group.
pub fn create_group() -> BindingGroup {
    BindingGroup::new()
}
