//! # Buffer Management
//!
//! Low-level storage primitives underneath the [`Vector`](crate::Vector) container.
//!
//! ## Modules
//!
//! - [`raw_buffer`]: exclusively owned, uninitialised slot storage with a
//!   guaranteed single release of its allocation.
//!
//! ## Safety
//!
//! The slot accessors work on raw pointers and perform no bounds or
//! initialisation checks. They are sound when used according to their
//! documented contracts.
pub mod raw_buffer;

pub use raw_buffer::RawBuffer;
