//! Tour of cells, clauses, and bindings

use std::cell::Cell as Slot;
use std::rc::Rc;

use corollary::{bind_explicit, create_bounded_cell, create_cell, create_group, ExprOps};

fn main() {
    println!("=== Corollary Basics ===\n");

    println!("1. Creating cells");
    let fruit = create_cell("apple");
    let count = create_cell(0);
    println!("   fruit = {}, count = {}", fruit.read(), count.read());

    println!("\n2. Binding a clause (change policy)");
    let binding = fruit.eq("banana").and(count.gte(3)).bind(false, || {
        println!("   [fired] three or more bananas!");
    });

    println!("   writing fruit = banana (clause still false)");
    fruit.write("banana");
    println!("   writing count = 1, 2, 3");
    count.write(1);
    count.write(2);
    count.write(3); // clause flips to true here
    println!("   writing count = 4 (no re-fire: result unchanged)");
    count.write(4);
    binding.unbind();

    println!("\n3. Forced bindings fire on every pass");
    let hits = Rc::new(Slot::new(0));
    let forced = {
        let hits = Rc::clone(&hits);
        count.gt(0).bind(true, move || hits.set(hits.get() + 1))
    };
    count.write(5);
    count.write(6);
    println!("   two writes, {} firings", hits.get());
    forced.unbind();

    println!("\n4. Flag probes observe the write itself");
    let echo = {
        let count = count.clone();
        count.set().bind(false, move || {
            println!("   [echo] count written: {}", count.read());
        })
    };
    count.write(6); // same value still raises the set flag
    count.write(7);
    echo.unbind();

    println!("\n5. Bounded cells silently reject out-of-range writes");
    let volume = create_bounded_cell(5, 0, 10);
    volume.write(11);
    println!("   wrote 11, volume is still {}", volume.read());
    volume.write(9);
    println!("   wrote 9, volume is now {}", volume.read());

    println!("\n6. Free-form tests over an explicit cell list");
    let a = create_cell(1);
    let b = create_cell(1);
    let watch = bind_explicit(
        &[a.clone(), b.clone()],
        false,
        {
            let (a, b) = (a.clone(), b.clone());
            move |_| Some(a.read().loose_eq(&b.read()))
        },
        || println!("   [fired] a caught up with b"),
    );
    b.write(2);
    a.write(2);
    watch.unbind();

    println!("\n7. Groups tear down in bulk");
    let group = create_group();
    group.insert(a.lt(&b).bind(false, || println!("   a < b")));
    group.insert(a.gt(&b).bind(false, || println!("   a > b")));
    println!("   {} bindings in the group", group.len());
    group.unbind_all();
    println!("   after unbind_all: {} bindings", group.len());

    println!("\n✓ Done!");
}
