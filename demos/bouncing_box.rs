//! Headless bouncing-box physics driven entirely by wall clauses

use std::cell::Cell as Slot;
use std::rc::Rc;

use corollary::{create_cell, create_group, ExprOps};

const WIDTH: f64 = 80.0;
const HEIGHT: f64 = 24.0;

fn main() {
    println!("=== Bouncing Box ===\n");

    let x = create_cell(10.0);
    let y = create_cell(5.0);
    let vx = Rc::new(Slot::new(2.5));
    let vy = Rc::new(Slot::new(1.25));
    let bounces = Rc::new(Slot::new(0u32));

    let group = create_group();

    // Wall clauses: each fires once when its coordinate crosses into the
    // wall zone, flips the velocity, and stays quiet until the box leaves
    // and comes back.
    group.insert(
        x.lte(0.0)
            .or(x.gte(WIDTH))
            .bind(false, {
                let vx = Rc::clone(&vx);
                let bounces = Rc::clone(&bounces);
                move || {
                    vx.set(-vx.get());
                    bounces.set(bounces.get() + 1);
                }
            })
            .set_label("x wall"),
    );
    group.insert(
        y.lte(0.0)
            .or(y.gte(HEIGHT))
            .bind(false, {
                let vy = Rc::clone(&vy);
                let bounces = Rc::clone(&bounces);
                move || {
                    vy.set(-vy.get());
                    bounces.set(bounces.get() + 1);
                }
            })
            .set_label("y wall"),
    );

    // Render clause: marks the frame dirty whenever either coordinate
    // actually changes value.
    let dirty = Rc::new(Slot::new(false));
    group.insert(x.changed().or(y.changed()).bind(false, {
        let dirty = Rc::clone(&dirty);
        move || dirty.set(true)
    }));

    for step in 0..200 {
        x.write(x.read().as_number().unwrap_or(0.0) + vx.get());
        y.write(y.read().as_number().unwrap_or(0.0) + vy.get());

        if step % 20 == 0 && dirty.get() {
            println!(
                "   step {:3}: box at ({:5.1}, {:5.1}), {} bounces so far",
                step,
                x.read().as_number().unwrap_or(0.0),
                y.read().as_number().unwrap_or(0.0),
                bounces.get()
            );
            dirty.set(false);
        }
    }

    println!("\n   total bounces: {}", bounces.get());
    group.unbind_all();
    println!("\n✓ Simulation complete!");
}
