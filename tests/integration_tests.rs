//! Integration tests for Corollary

use std::cell::{Cell as Counter, RefCell};
use std::rc::Rc;

use corollary::{
    bind_explicit, bind_explicit_else, create_bounded_cell, create_cell, create_group, probe,
    Binding, ExprOps, Value,
};

fn counter() -> (Rc<Counter<usize>>, impl Fn() + 'static) {
    let hits = Rc::new(Counter::new(0));
    let bump = {
        let hits = Rc::clone(&hits);
        move || hits.set(hits.get() + 1)
    };
    (hits, bump)
}

#[test]
fn and_clause_fires_once_when_it_becomes_true() {
    let a = create_cell(false);
    let b = create_cell(false);
    let (hits, bump) = counter();

    let binding = a.and(&b).bind(false, bump);

    a.write(true); // result stays false -> false
    assert_eq!(hits.get(), 0);
    b.write(true); // false -> true
    assert_eq!(hits.get(), 1);

    binding.unbind();
    a.write(false);
    a.write(true);
    assert_eq!(hits.get(), 1);
}

#[test]
fn modulus_clause_fires_on_every_multiple() {
    let a = create_cell(0);
    let (hits, bump) = counter();

    let binding = a.rem(100).eq(0).bind(false, bump);
    for i in 1..=1000 {
        a.write(i);
    }
    assert_eq!(hits.get(), 10);
    binding.unbind();
}

#[test]
fn set_probe_observes_writes_not_reads() {
    let a = create_cell(true);
    let b = create_cell(false);
    let (hits, bump) = counter();

    let binding = a.and(b.set()).bind(true, bump);

    // Plain reads are not observable events.
    let _ = b.read();
    let _ = b.read();
    assert_eq!(hits.get(), 0);

    // Any write to b raises its set flag for the pass, changed or not.
    b.write(false);
    assert_eq!(hits.get(), 1);
    b.write(true);
    assert_eq!(hits.get(), 2);
    binding.unbind();
}

#[test]
fn flag_probe_promotes_binding_to_forced_mode() {
    let a = create_cell(true);
    let b = create_cell(false);
    let (hits, bump) = counter();

    // force = false, but the set() probe is a one-shot event the change
    // policy cannot see, so the binding re-fires every pass anyway.
    let binding = a.and(b.set()).bind(false, bump);

    b.write(false);
    b.write(false);
    assert_eq!(hits.get(), 2);
    binding.unbind();
}

#[test]
fn unbound_binding_never_fires_again() {
    let a = create_cell(0);
    let b = create_cell(0);
    let (hits, bump) = counter();

    let binding = a.eq(&b).bind(true, bump);
    a.write(1); // a != b, true-handler stays quiet
    assert_eq!(hits.get(), 0);
    b.write(1); // a == b now
    assert_eq!(hits.get(), 1);

    binding.unbind();
    for i in 0..100 {
        a.write(i);
        b.write(i);
    }
    assert_eq!(hits.get(), 1);
    assert!(!binding.is_bound());
}

#[test]
fn and_does_not_read_past_a_falsy_operand() {
    let a = create_cell(false);
    let probe_hits = Rc::new(Counter::new(0));
    let p = {
        let probe_hits = Rc::clone(&probe_hits);
        probe(move || {
            probe_hits.set(probe_hits.get() + 1);
            true
        })
    };
    let (_, bump) = counter();
    let binding = a.and(p).bind(true, bump);

    a.write(false);
    assert_eq!(probe_hits.get(), 0);
    a.write(true);
    assert_eq!(probe_hits.get(), 1);
    binding.unbind();
}

#[test]
fn or_does_not_read_past_a_truthy_operand() {
    let a = create_cell(true);
    let probe_hits = Rc::new(Counter::new(0));
    let p = {
        let probe_hits = Rc::clone(&probe_hits);
        probe(move || {
            probe_hits.set(probe_hits.get() + 1);
            false
        })
    };
    let (_, bump) = counter();
    let binding = a.or(p).bind(true, bump);

    a.write(true);
    assert_eq!(probe_hits.get(), 0);
    a.write(false);
    assert_eq!(probe_hits.get(), 1);
    binding.unbind();
}

#[test]
fn eq_chain_skips_operands_after_the_first_failing_pair() {
    let a = create_cell(1);
    let b = create_cell(2);
    let c = create_cell(1);
    let probe_hits = Rc::new(Counter::new(0));
    let p = {
        let probe_hits = Rc::clone(&probe_hits);
        probe(move || {
            probe_hits.set(probe_hits.get() + 1);
            1
        })
    };
    let (hits, bump) = counter();
    // eq(a, b, c, probe): a == b fails first, so neither c nor the probe
    // is read.
    let binding = a.eq((&b, &c, p)).bind(true, bump);

    a.write(1);
    assert_eq!(probe_hits.get(), 0);
    assert_eq!(hits.get(), 0);

    b.write(1);
    assert_eq!(probe_hits.get(), 1);
    assert_eq!(hits.get(), 1);
    binding.unbind();
}

#[test]
fn bounded_writes_are_idempotent_rejects() {
    let a = create_bounded_cell(5, 0, 10);
    let (passes, bump) = counter();
    let binding = bind_explicit(&[a.clone()], true, |_| Some(true), bump);

    a.write(11);
    a.write(-1);
    a.write(100);
    assert_eq!(a.read(), Value::Int(5));
    assert_eq!(passes.get(), 0); // no notification at all

    a.write(10);
    assert_eq!(a.read(), Value::Int(10));
    assert_eq!(passes.get(), 1);
    binding.unbind();
}

#[test]
fn explicit_logic_matrix() {
    // Four-cell (a && b) || (c && d) matrix on a forced binding.
    let a = create_cell(false);
    let b = create_cell(false);
    let c = create_cell(false);
    let d = create_cell(false);

    let (true_hits, bump_true) = counter();
    let (false_hits, bump_false) = counter();
    let cells = [a.clone(), b.clone(), c.clone(), d.clone()];
    let binding = bind_explicit_else(
        &cells,
        true,
        {
            let (a, b, c, d) = (a.clone(), b.clone(), c.clone(), d.clone());
            move |_| {
                Some(
                    (a.read().truthy() && b.read().truthy())
                        || (c.read().truthy() && d.read().truthy()),
                )
            }
        },
        bump_true,
        bump_false,
    );

    a.write(true);
    b.write(false);
    c.write(true);
    d.write(false);
    assert_eq!((true_hits.get(), false_hits.get()), (0, 4));

    b.write(true);
    assert_eq!((true_hits.get(), false_hits.get()), (1, 4));

    d.write(true);
    assert_eq!((true_hits.get(), false_hits.get()), (2, 4));

    a.write(false);
    c.write(false);
    assert_eq!((true_hits.get(), false_hits.get()), (3, 5));

    binding.unbind();
}

#[test]
fn set_and_changed_probes_from_a_free_form_test() {
    let a = create_cell(true);
    let b = create_cell(false);
    let cells = [a.clone(), b.clone()];

    let (true_hits, bump_true) = counter();
    let (false_hits, bump_false) = counter();
    let value_binding = bind_explicit_else(
        &cells,
        true,
        {
            let (a, b) = (a.clone(), b.clone());
            move |_| Some(a.read().truthy() && b.read().truthy())
        },
        bump_true,
        bump_false,
    );

    let (set_hits, bump_set) = counter();
    let set_binding = bind_explicit(
        &cells,
        true,
        {
            let (a, b) = (a.clone(), b.clone());
            move |_| Some(a.read().truthy() && b.was_set())
        },
        bump_set,
    );

    let (changed_hits, bump_changed) = counter();
    let changed_binding = bind_explicit(
        &cells,
        true,
        {
            let (a, b) = (a.clone(), b.clone());
            move |_| Some(a.read().truthy() && b.was_changed())
        },
        bump_changed,
    );

    b.write(false); // set but not changed
    assert_eq!((true_hits.get(), false_hits.get()), (0, 1));
    assert_eq!((set_hits.get(), changed_hits.get()), (1, 0));

    b.write(true); // set and changed
    assert_eq!((true_hits.get(), false_hits.get()), (1, 1));
    assert_eq!((set_hits.get(), changed_hits.get()), (2, 1));

    b.write(false); // set and changed back
    assert_eq!((true_hits.get(), false_hits.get()), (1, 2));
    assert_eq!((set_hits.get(), changed_hits.get()), (3, 2));

    value_binding.unbind();
    set_binding.unbind();
    changed_binding.unbind();
}

#[test]
fn subscribers_fire_in_registration_order() {
    let a = create_cell(0);
    let order = Rc::new(RefCell::new(Vec::new()));

    let group = create_group();
    for tag in 1..=3 {
        let order = Rc::clone(&order);
        group.insert(bind_explicit(
            &[a.clone()],
            true,
            |_| Some(true),
            move || order.borrow_mut().push(tag),
        ));
    }

    a.write(1);
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    a.write(2);
    assert_eq!(*order.borrow(), vec![1, 2, 3, 1, 2, 3]);
    group.unbind_all();
}

#[test]
fn reentrant_write_is_suppressed_for_the_binding_on_stack() {
    let a = create_cell(0);

    // First binding: when a becomes 1, immediately rewrite it to 2. The
    // nested pass must not recurse into this binding.
    let rewriter = bind_explicit(
        &[a.clone()],
        false,
        {
            let a = a.clone();
            move |_| Some(a.read().loose_eq(&1.into()))
        },
        {
            let a = a.clone();
            move || a.write(2)
        },
    );

    // Second binding: records every value it observes. It is re-tested by
    // the nested pass (seeing the new value) and again by the outer pass.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = bind_explicit(
        &[a.clone()],
        true,
        |_| Some(true),
        {
            let a = a.clone();
            let seen = Rc::clone(&seen);
            move || seen.borrow_mut().push(a.read())
        },
    );

    a.write(1);
    assert_eq!(a.read(), Value::Int(2));
    assert_eq!(*seen.borrow(), vec![Value::Int(2), Value::Int(2)]);
    assert_eq!(rewriter.last_result(), Some(true));

    rewriter.unbind();
    recorder.unbind();
}

#[test]
fn sibling_unbound_mid_pass_does_not_fire() {
    let a = create_cell(false);
    let victim: Rc<RefCell<Option<Binding>>> = Rc::new(RefCell::new(None));

    // Registered first, so it runs first and unbinds its sibling before
    // the pass reaches it.
    let assassin = {
        let victim = Rc::clone(&victim);
        a.bind(true, move || {
            if let Some(binding) = victim.borrow().as_ref() {
                binding.unbind();
            }
        })
    };

    let (hits, bump) = counter();
    *victim.borrow_mut() = Some(a.bind(true, bump));

    a.write(true);
    assert_eq!(hits.get(), 0);
    a.write(false);
    assert_eq!(hits.get(), 0);
    assassin.unbind();
}

#[test]
fn sibling_unbound_after_firing_keeps_its_delivery() {
    let a = create_cell(false);
    let (hits, bump) = counter();

    // Registered first, so it has already fired when the second binding
    // unbinds it.
    let early = a.bind(true, bump);
    let late = {
        let early = early.clone();
        a.bind(true, move || early.unbind())
    };

    a.write(true);
    assert_eq!(hits.get(), 1);
    a.write(false);
    assert_eq!(hits.get(), 1);
    late.unbind();
}

#[test]
fn binding_created_mid_pass_is_not_notified_by_that_pass() {
    let a = create_cell(false);
    let (late_hits, late_bump) = counter();
    let spawned: Rc<RefCell<Option<Binding>>> = Rc::new(RefCell::new(None));

    let spawner = {
        let a = a.clone();
        let spawned = Rc::clone(&spawned);
        let late_bump = RefCell::new(Some(late_bump));
        a.clone().bind(true, move || {
            if let Some(bump) = late_bump.borrow_mut().take() {
                *spawned.borrow_mut() = Some(a.bind(true, bump));
            }
        })
    };

    a.write(true);
    assert_eq!(late_hits.get(), 0); // snapshot taken before it existed

    a.write(true); // same value: still a pass, and the clause is truthy
    assert_eq!(late_hits.get(), 1);

    spawner.unbind();
    spawned.borrow().as_ref().unwrap().unbind();
}

#[test]
fn nested_operand_groups_flatten_in_order() {
    let a = create_cell(true);
    let b = create_cell(true);
    let c = create_cell(true);
    let d = create_cell(false);
    let (hits, bump) = counter();

    let binding = a.and((&b, vec![c.clone(), d.clone()])).bind(false, bump);

    d.write(true);
    assert_eq!(hits.get(), 1);
    b.write(false);
    c.write(false); // result already false; no further fire
    assert_eq!(hits.get(), 1);
    binding.unbind();
}

#[test]
fn last_value_is_visible_during_the_notification() {
    let x = create_cell(1);
    let observed = Rc::new(RefCell::new(Vec::new()));

    let binding = bind_explicit(
        &[x.clone()],
        true,
        {
            let x = x.clone();
            let observed = Rc::clone(&observed);
            move |_| {
                observed.borrow_mut().push((x.was_changed(), x.last()));
                Some(true)
            }
        },
        || {},
    );

    x.write(5);
    x.write(5);
    assert_eq!(
        *observed.borrow(),
        vec![(true, Value::Int(1)), (false, Value::Int(1))]
    );
    binding.unbind();
}

#[test]
fn panicking_handler_unwinds_through_the_write() {
    let a = create_cell(false);
    let thrower = a.bind(true, || panic!("handler exploded"));
    let (hits, bump) = counter();
    let survivor = a.bind(true, bump);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        a.write(true);
    }));
    assert!(result.is_err());
    // Delivery is at-least-once, not atomic: the later subscriber in the
    // snapshot was never reached.
    assert_eq!(hits.get(), 0);

    // The engine itself is still functional once the thrower is removed.
    thrower.unbind();
    a.write(true);
    assert_eq!(hits.get(), 1);
    survivor.unbind();
}

#[test]
fn transient_flags_clear_even_when_a_pass_unwinds() {
    let a = create_cell(0);
    let thrower = bind_explicit(&[a.clone()], true, |_| Some(true), || {
        panic!("handler exploded")
    });

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        a.write(1);
    }));
    assert!(result.is_err());
    assert!(!a.was_set());
    assert!(!a.was_changed());
    thrower.unbind();

    // A set() probe in a later, unrelated pass must not see a stale flag.
    let b = create_cell(0);
    let saw = Rc::new(RefCell::new(Vec::new()));
    let watcher = bind_explicit(
        &[a.clone(), b.clone()],
        true,
        {
            let a = a.clone();
            let saw = Rc::clone(&saw);
            move |_| {
                saw.borrow_mut().push(a.was_set());
                Some(true)
            }
        },
        || {},
    );
    b.write(1);
    assert_eq!(*saw.borrow(), vec![false]);
    watcher.unbind();
}

#[test]
fn independent_cells_are_not_batched() {
    let a = create_cell(0);
    let b = create_cell(0);
    let (hits, bump) = counter();

    let binding = bind_explicit(&[a.clone(), b.clone()], true, |_| Some(true), bump);

    a.write(1);
    b.write(1);
    a.write(2);
    assert_eq!(hits.get(), 3); // one pass per write, never coalesced
    binding.unbind();
}

#[test]
fn shared_clause_backs_independent_bindings() {
    let a = create_cell(false);
    let clause = a.eq(true);

    let (hits_1, bump_1) = counter();
    let (hits_2, bump_2) = counter();
    let b1 = clause.bind(false, bump_1);
    let b2 = clause.bind(true, bump_2);

    a.write(true);
    a.write(true);
    assert_eq!(hits_1.get(), 1); // change policy
    assert_eq!(hits_2.get(), 2); // forced

    b1.unbind();
    a.write(false); // result false: no handler on either binding
    a.write(true);
    assert_eq!(hits_1.get(), 1);
    assert_eq!(hits_2.get(), 3);
    b2.unbind();
}
