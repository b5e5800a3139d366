use std::cell::{Cell as Flag, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;

use log::trace;

use crate::binding::BindingCore;
use crate::runtime;
use crate::value::Value;

/// An observable, optionally bounded value slot.
///
/// `Cell` is a cheap clonable handle; clones share the same slot. Writing a
/// new value synchronously re-tests every binding subscribed to the cell,
/// in registration order, on the caller's stack. Plain reads are never
/// observable events.
///
/// # Example
///
/// ```
/// use corollary::create_cell;
///
/// let count = create_cell(0);
/// assert_eq!(count.read(), 0.into());
/// count.write(42);
/// assert_eq!(count.read(), 42.into());
/// ```
#[derive(Clone)]
pub struct Cell {
    inner: Rc<CellInner>,
}

struct CellInner {
    id: usize,
    state: RefCell<CellState>,
    // Transient probe flags, meaningful only to code running inside the
    // notification pass triggered by a write.
    was_set: Flag<bool>,
    was_changed: Flag<bool>,
    // Registration order. Snapshotted before every notification pass.
    subscribers: RefCell<Vec<Rc<BindingCore>>>,
}

struct CellState {
    value: Value,
    last: Value,
    min: Option<Value>,
    max: Option<Value>,
}

/// Clears the transient flags even when a subscriber panics mid-pass, so a
/// later pass cannot observe a stale `was_set`/`was_changed`.
struct FlagGuard<'a> {
    was_set: &'a Flag<bool>,
    was_changed: &'a Flag<bool>,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.was_changed.set(false);
        self.was_set.set(false);
    }
}

impl Cell {
    /// Create an unbounded cell. No notification occurs at construction.
    pub fn new(initial: impl Into<Value>) -> Self {
        Self::with_bounds(initial, None, None)
    }

    /// Create a cell that silently rejects writes outside the closed
    /// interval `[min, max]`. Either bound may be absent.
    pub fn with_bounds(
        initial: impl Into<Value>,
        min: Option<Value>,
        max: Option<Value>,
    ) -> Self {
        let initial = initial.into();
        Self {
            inner: Rc::new(CellInner {
                id: runtime::next_id(),
                state: RefCell::new(CellState {
                    last: initial.clone(),
                    value: initial,
                    min,
                    max,
                }),
                was_set: Flag::new(false),
                was_changed: Flag::new(false),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The cell's registry key.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Current value. Reading is side-effect free and never triggers
    /// notification.
    pub fn read(&self) -> Value {
        self.inner.state.borrow().value.clone()
    }

    /// Write a new value and synchronously re-test all subscribers.
    ///
    /// If the cell is bounded and `value` falls outside `[min, max]`, the
    /// call is a silent no-op: no flag changes, no notification, and the
    /// observable state is identical to before the call.
    ///
    /// Otherwise `was_set` is raised for the duration of the pass; if the
    /// value loosely differs from the current one, the old value is
    /// recorded as [`Cell::last`] and `was_changed` is raised as well. The
    /// subscriber list is snapshotted before iterating, so handlers may
    /// bind or unbind freely during the pass. Both flags are cleared when
    /// the pass ends, even when it ends by unwinding.
    pub fn write(&self, value: impl Into<Value>) {
        let value = value.into();
        {
            let state = self.inner.state.borrow();
            let below = state
                .min
                .as_ref()
                .is_some_and(|min| matches!(value.compare(min), Some(Ordering::Less)));
            let above = state
                .max
                .as_ref()
                .is_some_and(|max| matches!(value.compare(max), Some(Ordering::Greater)));
            if below || above {
                trace!("cell {} rejected out-of-bounds write {value}", self.inner.id);
                return;
            }
        }

        self.inner.was_set.set(true);
        let _guard = FlagGuard {
            was_set: &self.inner.was_set,
            was_changed: &self.inner.was_changed,
        };
        {
            let mut state = self.inner.state.borrow_mut();
            if state.value.loose_eq(&value) {
                state.value = value;
            } else {
                state.last = std::mem::replace(&mut state.value, value);
                self.inner.was_changed.set(true);
            }
        }

        let snapshot: Vec<Rc<BindingCore>> = self.inner.subscribers.borrow().clone();
        trace!(
            "cell {} written, re-testing {} subscribers",
            self.inner.id,
            snapshot.len()
        );
        for binding in snapshot {
            binding.retest();
        }
    }

    /// Whether this cell was written during the in-flight notification.
    /// Outside a notification pass this is always `false`.
    pub fn was_set(&self) -> bool {
        self.inner.was_set.get()
    }

    /// Whether the in-flight write changed the value (loose inequality).
    /// Outside a notification pass this is always `false`.
    pub fn was_changed(&self) -> bool {
        self.inner.was_changed.get()
    }

    /// The value held before the most recent change. Until the first
    /// change this is the initial value.
    pub fn last(&self) -> Value {
        self.inner.state.borrow().last.clone()
    }

    /// Subscribe a binding; duplicates (by registry key) are ignored, and
    /// the first registration fixes this binding's place in the
    /// notification order.
    pub(crate) fn register(&self, binding: &Rc<BindingCore>) {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        if subscribers.iter().any(|b| b.id() == binding.id()) {
            return;
        }
        subscribers.push(Rc::clone(binding));
    }

    /// Drop a subscription. Missing entries are ignored.
    pub(crate) fn unregister(&self, binding_id: usize) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|b| b.id() != binding_id);
    }
}

/// Create an unbounded cell (see [`Cell::new`]).
pub fn create_cell(initial: impl Into<Value>) -> Cell {
    Cell::new(initial)
}

/// Create a bounded cell (see [`Cell::with_bounds`]).
pub fn create_bounded_cell(
    initial: impl Into<Value>,
    min: impl Into<Value>,
    max: impl Into<Value>,
) -> Cell {
    Cell::with_bounds(initial, Some(min.into()), Some(max.into()))
}
