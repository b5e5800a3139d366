use std::cell::{Cell as Flag, RefCell};
use std::rc::Rc;

use log::trace;

use crate::cell::Cell;
use crate::expr::Expr;
use crate::runtime;

pub(crate) type Handler = Rc<dyn Fn()>;
type TestFn = Rc<dyn Fn(Option<bool>) -> Option<bool>>;

enum Test {
    /// Expression-tree clause; the result is the tree value's truthiness.
    Clause(Expr),
    /// Free-form test over explicitly watched cells. Receives the previous
    /// result; `None` suppresses both handlers for the pass.
    Free(TestFn),
}

/// Shared binding state, held strongly by every watched cell while bound.
pub(crate) struct BindingCore {
    id: usize,
    force: bool,
    test: Test,
    on_true: Handler,
    on_false: Option<Handler>,
    last_result: Flag<Option<bool>>,
    evaluating: Flag<bool>,
    bound: Flag<bool>,
    watched: RefCell<Vec<Cell>>,
    label: RefCell<Option<String>>,
}

/// Clears the re-entrancy guard even if a test or handler panics, so the
/// binding is not wedged by an unwound pass. The panic itself still
/// propagates out through the triggering write.
struct EvalGuard<'a>(&'a Flag<bool>);

impl Drop for EvalGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl BindingCore {
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Re-test, invoked by a watched cell's write notification.
    ///
    /// Returns immediately when the binding is unbound, or when it is
    /// already evaluating (a handler-induced write to a cell on this
    /// binding's own evaluation stack must not recurse into it; the new
    /// value is still visible to every other binding).
    pub(crate) fn retest(&self) {
        if !self.bound.get() || self.evaluating.get() {
            return;
        }
        self.evaluating.set(true);
        let _guard = EvalGuard(&self.evaluating);

        let result = match &self.test {
            Test::Clause(expr) => Some(expr.eval().truthy()),
            Test::Free(test) => test(self.last_result.get()),
        };

        if let Some(outcome) = result {
            if self.force || Some(outcome) != self.last_result.get() {
                trace!("binding {} fires on {}", self.describe(), outcome);
                if outcome {
                    (self.on_true)();
                } else if let Some(on_false) = &self.on_false {
                    on_false();
                }
            }
        }
        self.last_result.set(result);
    }

    fn describe(&self) -> String {
        match self.label.borrow().as_deref() {
            Some(label) => format!("{} ({label})", self.id),
            None => self.id.to_string(),
        }
    }
}

/// Handle to an active subscription.
///
/// The watched cells hold the binding alive, so dropping the handle does
/// *not* tear the subscription down; only an explicit [`Binding::unbind`]
/// does. Unbind is idempotent, and once it returns the binding can never
/// fire again, even from a notification pass already in flight.
#[derive(Clone)]
pub struct Binding {
    core: Rc<BindingCore>,
}

impl Binding {
    pub(crate) fn from_clause(
        expr: Expr,
        force: bool,
        on_true: Handler,
        on_false: Option<Handler>,
    ) -> Binding {
        let mut leaves = Vec::new();
        let mut saw_flag_probe = false;
        expr.collect_leaves(&mut leaves, &mut saw_flag_probe);
        // Flag probes report one-shot events the change policy cannot see;
        // their presence forces re-fire.
        Self::establish(
            Test::Clause(expr),
            force || saw_flag_probe,
            leaves,
            on_true,
            on_false,
        )
    }

    pub(crate) fn from_test(
        cells: &[Cell],
        force: bool,
        test: TestFn,
        on_true: Handler,
        on_false: Option<Handler>,
    ) -> Binding {
        let mut leaves: Vec<Cell> = Vec::new();
        for cell in cells {
            if !leaves.iter().any(|c| c.id() == cell.id()) {
                leaves.push(cell.clone());
            }
        }
        Self::establish(Test::Free(test), force, leaves, on_true, on_false)
    }

    fn establish(
        test: Test,
        force: bool,
        leaves: Vec<Cell>,
        on_true: Handler,
        on_false: Option<Handler>,
    ) -> Binding {
        let core = Rc::new(BindingCore {
            id: runtime::next_id(),
            force,
            test,
            on_true,
            on_false,
            last_result: Flag::new(Some(false)),
            evaluating: Flag::new(false),
            bound: Flag::new(true),
            watched: RefCell::new(leaves),
            label: RefCell::new(None),
        });
        for cell in core.watched.borrow().iter() {
            cell.register(&core);
        }
        trace!(
            "binding {} established over {} cells",
            core.id,
            core.watched.borrow().len()
        );
        Binding { core }
    }

    /// The binding's registry key.
    pub fn id(&self) -> usize {
        self.core.id
    }

    /// Whether the binding is still subscribed to its leaf cells.
    pub fn is_bound(&self) -> bool {
        self.core.bound.get()
    }

    /// The previous test result (`None` after a suppressed free-form
    /// pass). Seeded with `Some(false)`, so a non-forced binding stays
    /// silent while its clause keeps evaluating false.
    pub fn last_result(&self) -> Option<bool> {
        self.core.last_result.get()
    }

    /// Remove this binding from every watched cell's subscriber list.
    ///
    /// Safe to call any number of times. After the first call returns, no
    /// cell write can reach this binding again, even when a reference to
    /// it is retained elsewhere.
    pub fn unbind(&self) {
        if !self.core.bound.get() {
            return;
        }
        self.core.bound.set(false);
        for cell in self.core.watched.borrow().iter() {
            cell.unregister(self.core.id);
        }
        self.core.watched.borrow_mut().clear();
        trace!("binding {} unbound", self.core.describe());
    }

    /// Attach a diagnostic label, reported in trace logging. Chainable at
    /// establishment.
    pub fn set_label(self, label: impl Into<String>) -> Binding {
        *self.core.label.borrow_mut() = Some(label.into());
        self
    }
}

/// Establish a binding over an explicit cell list and free-form test.
///
/// `test` receives the binding's previous result and may read any watched
/// cell's value or transient flags ([`Cell::read`], [`Cell::was_set`],
/// [`Cell::was_changed`], [`Cell::last`]). Returning `None` suppresses
/// both handlers for the pass. `force` has the same meaning as in
/// [`crate::ExprOps::bind`].
///
/// # Example
///
/// ```
/// use corollary::{bind_explicit, create_cell};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = create_cell(0);
/// let hits = Rc::new(Cell::new(0));
/// let binding = bind_explicit(
///     &[a.clone()],
///     false,
///     {
///         let a = a.clone();
///         move |_| Some(a.read().loose_eq(&100.into()))
///     },
///     {
///         let hits = Rc::clone(&hits);
///         move || hits.set(hits.get() + 1)
///     },
/// );
/// a.write(100);
/// assert_eq!(hits.get(), 1);
/// binding.unbind();
/// ```
pub fn bind_explicit(
    cells: &[Cell],
    force: bool,
    test: impl Fn(Option<bool>) -> Option<bool> + 'static,
    on_true: impl Fn() + 'static,
) -> Binding {
    Binding::from_test(cells, force, Rc::new(test), Rc::new(on_true), None)
}

/// Like [`bind_explicit`], with a handler for the negative outcome.
pub fn bind_explicit_else(
    cells: &[Cell],
    force: bool,
    test: impl Fn(Option<bool>) -> Option<bool> + 'static,
    on_true: impl Fn() + 'static,
    on_false: impl Fn() + 'static,
) -> Binding {
    Binding::from_test(
        cells,
        force,
        Rc::new(test),
        Rc::new(on_true),
        Some(Rc::new(on_false)),
    )
}
