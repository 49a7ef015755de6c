//! # Contiguous Growable Vector
//! This crate provides [`Vector<T>`], a resizable sequence container that stores
//! its elements in one exclusively owned heap buffer, together with address-based
//! position handles that detect when they have outlived the buffer layout they
//! were issued for.
//!
//! ## Modules
//!
//! - `buff_manager`: raw slot storage with paired allocation and release.
//! - `vector`: the container, its position handles and its std trait surface.
//! - `error`: [`VecError`] and the crate [`Result`] alias.
//!
//! ## Example
//! ```
//! use axiom_vec::{Vector, vector};
//!
//! let mut v = vector![1, 2, 3];
//! v.insert(v.cbegin() + 1usize, 99).unwrap();
//! assert_eq!(v, [1, 99, 2, 3]);
//!
//! v.erase(v.cbegin()).unwrap();
//! assert_eq!(v, [99, 2, 3]);
//! ```
//!
//! ## Safety
//!
//! Position handles do not borrow the vector. Their direct dereference methods
//! are `unsafe`; the checked accessors on [`Vector`] validate a handle's
//! generation and range before touching memory.
//!
//! ## Threading
//!
//! Nothing here synchronises. Share a vector across threads only behind your own lock.
pub mod buff_manager;
pub mod error;
pub mod vector;

pub use error::{Result, VecError};
pub use vector::{ConstPosition, IntoIter, Position, ReversePosition, Vector};

/// Builds a [`Vector`] from an element list, like `vec!`.
///
/// - `vector![]`: empty, default capacity.
/// - `vector![a, b, c]`: capacity and length equal to the list length.
/// - `vector![value; n]`: `n` clones of `value`.
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Vector::from_elem($elem, $n)
    };
    ($($item:expr),+ $(,)?) => {
        $crate::Vector::from([$($item),+])
    };
}
