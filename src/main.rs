//! # Example: Exercising the Vector
//!
//! This demo walks through the main `axiom_vec` operations:
//! - Appending with amortised growth
//! - Positional insert / erase through position handles
//! - O(1) swap and move-out
//!
//! Run with `RUST_LOG=trace` to see every reallocation and the clone/drop
//! events of the instrumented element type.

use axiom_vec::{Vector, vector};
use log::info;

/// Element type that reports clones and drops, so relocation traffic is visible.
#[derive(Debug)]
struct Float3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Float3 {
    fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }
}

impl Clone for Float3 {
    fn clone(&self) -> Self {
        info!("clone {:?}", self);
        Self {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

impl Drop for Float3 {
    fn drop(&mut self) {
        info!("drop ({}, {}, {})", self.x, self.y, self.z);
    }
}

fn print<T: std::fmt::Debug>(label: &str, vec: &Vector<T>) {
    println!("{label}: size {} capacity {}", vec.size(), vec.capacity());
    for item in vec {
        println!("  {item:?}");
    }
    println!("------------------------------");
}

fn main() {
    env_logger::init();

    // -------------------------------------------------------------------------
    // Appending: growth reallocates without cloning
    // -------------------------------------------------------------------------
    let mut foo = Vector::new();
    foo.push_back(Float3::splat(1.0));
    foo.push_back(Float3 { x: 1.0, y: 2.0, z: 3.0 });
    foo.emplace_back(|| Float3 { x: 4.1, y: 5.3, z: 6.1 });
    print("foo", &foo);

    let mut bar = Vector::new();
    for i in 1..3 {
        bar.push_back(Float3::splat(i as f32));
    }
    print("bar", &bar);

    // -------------------------------------------------------------------------
    // Swap: buffers trade owners, elements stay put
    // -------------------------------------------------------------------------
    bar.swap(&mut foo);
    print("foo after swap", &foo);

    // -------------------------------------------------------------------------
    // Positional insertion through handles
    // -------------------------------------------------------------------------
    let mut glee = vector![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    for offset in [1usize, 4, 9] {
        if let Err(err) = glee.emplace(glee.cbegin() + offset, || 100) {
            eprintln!("emplace failed: {err}");
        }
    }
    print("glee", &glee);

    // A handle from before the shift is rejected instead of read.
    let stale = glee.cbegin();
    if glee.erase(glee.cbegin()).is_ok() {
        match glee.get_at(stale) {
            Ok(value) => println!("stale handle read {value}"),
            Err(err) => println!("stale handle rejected: {err}"),
        }
    }

    let mut bits = vector![true, false, true];
    bits.flip();
    print("bits", &bits);

    // -------------------------------------------------------------------------
    // Move-out leaves the source unallocated
    // -------------------------------------------------------------------------
    let moved = foo.take();
    print("moved", &moved);
    print("foo after take", &foo);

    println!("example run complete");
}
