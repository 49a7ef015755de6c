//! # Position Handles
//!
//! Address-based cursors into a [`Vector`](crate::Vector)'s buffer.
//!
//! - [`ConstPosition`]: read-only handle.
//! - [`Position`]: read-write handle; dereferences to a [`ConstPosition`] and
//!   converts into one, so it is accepted wherever a constant handle is.
//! - [`ReversePosition`]: wraps either handle and walks the buffer backwards.
//!
//! Every handle carries the buffer generation it was issued under. The vector bumps
//! its generation whenever it reallocates or shifts live slots, so a handle from
//! before such an operation no longer compares equal to fresh ones and is rejected
//! by the checked accessors ([`Vector::get_at`](crate::Vector::get_at) and the positional edits).
//!
//! ## Safety
//!
//! Handles do not borrow the vector. Address arithmetic is always safe (it wraps),
//! but the direct `unsafe` dereference methods trust the caller: the handle must
//! address a live slot of a buffer whose generation still matches.

use std::{
    cmp::Ordering,
    fmt,
    mem,
    ops::{Add, AddAssign, Deref, Sub, SubAssign},
    ptr::NonNull,
};

const fn is_zst<T>() -> bool {
    mem::size_of::<T>() == 0
}

/// Moves `ptr` by `n` elements. Zero-sized elements advance one byte per step so
/// distinct slots keep distinct addresses.
fn step<T>(ptr: *const T, n: isize) -> *const T {
    if is_zst::<T>() {
        (ptr as *const u8).wrapping_offset(n) as *const T
    } else {
        ptr.wrapping_offset(n)
    }
}

/// Signed distance from `origin` to `ptr`, in elements.
pub(crate) fn distance<T>(ptr: *const T, origin: *const T) -> isize {
    let bytes = (ptr as usize).wrapping_sub(origin as usize) as isize;
    bytes / mem::size_of::<T>().max(1) as isize
}

/// Read-only position handle.
pub struct ConstPosition<T> {
    ptr: *const T,
    generation: u64,
}

impl<T> ConstPosition<T> {
    pub(crate) const fn new(ptr: *const T, generation: u64) -> Self {
        Self { ptr, generation }
    }

    /// Address of the slot this handle points at.
    pub const fn as_ptr(&self) -> *const T {
        self.ptr
    }

    /// Buffer generation the handle was issued under.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns a reference to the addressed element.
    ///
    /// # Safety
    /// - The handle must address a live element (`begin <= self < end`).
    /// - No reallocation or shift may have happened since it was issued.
    /// - The returned reference must not outlive the element.
    pub unsafe fn get<'a>(&self) -> &'a T {
        if is_zst::<T>() {
            return unsafe { NonNull::<T>::dangling().as_ref() };
        }
        unsafe { &*self.ptr }
    }

    /// Returns a reference to the element `n` slots away, like `pos[n]`.
    ///
    /// # Safety
    /// Same contract as [`get`](Self::get), applied to `self + n`.
    pub unsafe fn at_offset<'a>(&self, n: isize) -> &'a T {
        unsafe { self.offset(n).get() }
    }

    /// Handle `n` slots away, under the same generation.
    pub fn offset(self, n: isize) -> Self {
        Self::new(step(self.ptr, n), self.generation)
    }

    /// Advances by one slot (pre-increment).
    pub fn inc(&mut self) -> &mut Self {
        *self = self.offset(1);
        self
    }

    /// Steps back by one slot (pre-decrement).
    pub fn dec(&mut self) -> &mut Self {
        *self = self.offset(-1);
        self
    }

    /// Advances by one slot and returns the previous handle (post-increment).
    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    /// Steps back by one slot and returns the previous handle (post-decrement).
    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }
}

impl<T> Clone for ConstPosition<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ConstPosition<T> {}

impl<T> PartialEq for ConstPosition<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr && self.generation == other.generation
    }
}

impl<T> Eq for ConstPosition<T> {}

impl<T> PartialOrd for ConstPosition<T> {
    /// Address order; handles from different generations are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.generation == other.generation).then(|| (self.ptr as usize).cmp(&(other.ptr as usize)))
    }
}

impl<T> Sub for ConstPosition<T> {
    type Output = isize;

    /// Signed distance in elements from `rhs` to `self`.
    ///
    /// Both handles must come from the same generation; the distance between
    /// handles of different buffer layouts is meaningless. Debug builds assert it.
    fn sub(self, rhs: Self) -> isize {
        debug_assert_eq!(
            self.generation, rhs.generation,
            "distance between handles of different generations"
        );
        distance(self.ptr, rhs.ptr)
    }
}

impl<T> fmt::Debug for ConstPosition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstPosition")
            .field("ptr", &self.ptr)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Read-write position handle.
///
/// Identical to [`ConstPosition`] apart from the mutable accessors. Methods that
/// only read are reached through `Deref`.
#[repr(transparent)]
pub struct Position<T> {
    pos: ConstPosition<T>,
}

impl<T> Position<T> {
    pub(crate) const fn new(ptr: *mut T, generation: u64) -> Self {
        Self {
            pos: ConstPosition::new(ptr, generation),
        }
    }

    /// Read-only view of this handle.
    pub const fn as_const(self) -> ConstPosition<T> {
        self.pos
    }

    /// Mutable address of the slot this handle points at.
    pub const fn as_mut_ptr(&self) -> *mut T {
        self.pos.ptr as *mut T
    }

    /// Returns a mutable reference to the addressed element.
    ///
    /// # Safety
    /// Same contract as [`ConstPosition::get`], and no other reference to the
    /// element may be alive while the returned one is used.
    pub unsafe fn get_mut<'a>(&self) -> &'a mut T {
        if is_zst::<T>() {
            return unsafe { NonNull::<T>::dangling().as_mut() };
        }
        unsafe { &mut *self.as_mut_ptr() }
    }

    /// Mutable reference to the element `n` slots away.
    ///
    /// # Safety
    /// Same contract as [`get_mut`](Self::get_mut), applied to `self + n`.
    pub unsafe fn at_offset_mut<'a>(&self, n: isize) -> &'a mut T {
        unsafe { self.offset(n).get_mut() }
    }

    pub fn offset(self, n: isize) -> Self {
        Self {
            pos: self.pos.offset(n),
        }
    }

    pub fn inc(&mut self) -> &mut Self {
        *self = self.offset(1);
        self
    }

    pub fn dec(&mut self) -> &mut Self {
        *self = self.offset(-1);
        self
    }

    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }
}

impl<T> Deref for Position<T> {
    type Target = ConstPosition<T>;

    fn deref(&self) -> &ConstPosition<T> {
        &self.pos
    }
}

impl<T> From<Position<T>> for ConstPosition<T> {
    fn from(pos: Position<T>) -> Self {
        pos.pos
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<T> Eq for Position<T> {}

impl<T> PartialEq<ConstPosition<T>> for Position<T> {
    fn eq(&self, other: &ConstPosition<T>) -> bool {
        self.pos == *other
    }
}

impl<T> PartialEq<Position<T>> for ConstPosition<T> {
    fn eq(&self, other: &Position<T>) -> bool {
        *self == other.pos
    }
}

impl<T> PartialOrd for Position<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.pos.partial_cmp(&other.pos)
    }
}

impl<T> Sub for Position<T> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        self.pos - rhs.pos
    }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("ptr", &self.pos.ptr)
            .field("generation", &self.pos.generation)
            .finish()
    }
}

/// `+ n`, `- n`, `+= n`, `-= n` for a handle type with an inherent `offset`.
macro_rules! impl_offset_ops {
    ($handle:ident) => {
        impl<T> Add<isize> for $handle<T> {
            type Output = Self;

            fn add(self, n: isize) -> Self {
                self.offset(n)
            }
        }

        impl<T> Sub<isize> for $handle<T> {
            type Output = Self;

            fn sub(self, n: isize) -> Self {
                self.offset(n.wrapping_neg())
            }
        }

        impl<T> Add<usize> for $handle<T> {
            type Output = Self;

            fn add(self, n: usize) -> Self {
                self.offset(n as isize)
            }
        }

        impl<T> Sub<usize> for $handle<T> {
            type Output = Self;

            fn sub(self, n: usize) -> Self {
                self.offset((n as isize).wrapping_neg())
            }
        }

        impl<T> AddAssign<isize> for $handle<T> {
            fn add_assign(&mut self, n: isize) {
                *self = self.offset(n);
            }
        }

        impl<T> SubAssign<isize> for $handle<T> {
            fn sub_assign(&mut self, n: isize) {
                *self = self.offset(n.wrapping_neg());
            }
        }

        impl<T> AddAssign<usize> for $handle<T> {
            fn add_assign(&mut self, n: usize) {
                *self = self.offset(n as isize);
            }
        }

        impl<T> SubAssign<usize> for $handle<T> {
            fn sub_assign(&mut self, n: usize) {
                *self = self.offset((n as isize).wrapping_neg());
            }
        }
    };
}

impl_offset_ops!(ConstPosition);
impl_offset_ops!(Position);

/// Common surface of forward handles, used by [`ReversePosition`].
pub trait SlotCursor: Copy {
    type Item;

    /// Handle `n` slots away.
    fn step(self, n: isize) -> Self;

    /// Read-only view of the handle.
    fn to_const(self) -> ConstPosition<Self::Item>;
}

impl<T> SlotCursor for ConstPosition<T> {
    type Item = T;

    fn step(self, n: isize) -> Self {
        self.offset(n)
    }

    fn to_const(self) -> ConstPosition<T> {
        self
    }
}

impl<T> SlotCursor for Position<T> {
    type Item = T;

    fn step(self, n: isize) -> Self {
        self.offset(n)
    }

    fn to_const(self) -> ConstPosition<T> {
        self.pos
    }
}

/// Reverse cursor over a forward handle.
///
/// Holds a `base` handle and addresses the slot just before it, so
/// `rbegin() == ReversePosition::new(end())` refers to the last element and
/// `rend() == ReversePosition::new(begin())` is one before the first.
/// Incrementing moves toward the front of the buffer.
#[derive(Clone, Copy)]
pub struct ReversePosition<P> {
    base: P,
}

impl<P: SlotCursor> ReversePosition<P> {
    pub const fn new(base: P) -> Self {
        Self { base }
    }

    /// The underlying forward handle (one past the addressed slot).
    pub const fn base(&self) -> P {
        self.base
    }

    /// Forward handle to the slot this cursor addresses.
    pub fn current(&self) -> P {
        self.base.step(-1)
    }

    /// Reference to the addressed element.
    ///
    /// # Safety
    /// Same contract as [`ConstPosition::get`], applied to [`current`](Self::current).
    pub unsafe fn get<'a>(&self) -> &'a P::Item {
        unsafe { self.current().to_const().get() }
    }

    /// Cursor `n` steps further along the reverse direction.
    pub fn offset(self, n: isize) -> Self {
        Self::new(self.base.step(n.wrapping_neg()))
    }

    pub fn inc(&mut self) -> &mut Self {
        *self = self.offset(1);
        self
    }

    pub fn dec(&mut self) -> &mut Self {
        *self = self.offset(-1);
        self
    }

    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }
}

impl<T> ReversePosition<Position<T>> {
    /// Mutable reference to the addressed element.
    ///
    /// # Safety
    /// Same contract as [`Position::get_mut`], applied to [`current`](Self::current).
    pub unsafe fn get_mut<'a>(&self) -> &'a mut T {
        unsafe { self.current().get_mut() }
    }
}

impl<T> From<ReversePosition<Position<T>>> for ReversePosition<ConstPosition<T>> {
    fn from(pos: ReversePosition<Position<T>>) -> Self {
        Self::new(pos.base.as_const())
    }
}

impl<P: SlotCursor> Add<isize> for ReversePosition<P> {
    type Output = Self;

    fn add(self, n: isize) -> Self {
        self.offset(n)
    }
}

impl<P: SlotCursor> Sub<isize> for ReversePosition<P> {
    type Output = Self;

    fn sub(self, n: isize) -> Self {
        self.offset(n.wrapping_neg())
    }
}

impl<P: SlotCursor> AddAssign<isize> for ReversePosition<P> {
    fn add_assign(&mut self, n: isize) {
        *self = self.offset(n);
    }
}

impl<P: SlotCursor> SubAssign<isize> for ReversePosition<P> {
    fn sub_assign(&mut self, n: isize) {
        *self = self.offset(n.wrapping_neg());
    }
}

impl<P: SlotCursor> PartialEq for ReversePosition<P> {
    fn eq(&self, other: &Self) -> bool {
        self.base.to_const() == other.base.to_const()
    }
}

impl<P: SlotCursor> PartialOrd for ReversePosition<P> {
    /// Reversed address order.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.base.to_const().partial_cmp(&self.base.to_const())
    }
}

impl<P: SlotCursor> fmt::Debug for ReversePosition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversePosition")
            .field("base", &self.base.to_const())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(data: &mut [i32], generation: u64) -> (Position<i32>, ConstPosition<i32>) {
        let ptr = data.as_mut_ptr();
        (Position::new(ptr, generation), ConstPosition::new(ptr, generation))
    }

    #[test]
    fn arithmetic_moves_by_element_width() {
        let mut data = [10, 20, 30, 40];
        let (_, begin) = positions(&mut data, 0);

        let third = begin + 2usize;
        assert_eq!(unsafe { *third.get() }, 30);
        assert_eq!(third - begin, 2);
        assert_eq!(unsafe { *(third - 1usize).get() }, 20);
        assert_eq!(unsafe { *begin.at_offset(3) }, 40);

        let mut cursor = begin;
        cursor += 3usize;
        cursor -= 1isize;
        assert_eq!(cursor, third);
    }

    #[test]
    fn pre_and_post_increment() {
        let mut data = [1, 2, 3];
        let (_, begin) = positions(&mut data, 0);

        let mut cursor = begin;
        let old = cursor.post_inc();
        assert_eq!(old, begin);
        assert_eq!(unsafe { *cursor.get() }, 2);

        assert_eq!(unsafe { *cursor.inc().get() }, 3);
        let old = cursor.post_dec();
        assert_eq!(unsafe { *old.get() }, 3);
        cursor.dec();
        assert_eq!(cursor, begin);
    }

    #[test]
    fn mutable_handle_writes_through() {
        let mut data = [1, 2, 3];
        let (begin, _) = positions(&mut data, 0);

        unsafe {
            *begin.get_mut() = 100;
            *begin.at_offset_mut(2) += 5;
        }
        assert_eq!(data, [100, 2, 8]);
    }

    #[test]
    fn mutable_handle_is_usable_as_const() {
        let mut data = [7, 8];
        let (begin, cbegin) = positions(&mut data, 3);

        let as_const: ConstPosition<i32> = begin.into();
        assert_eq!(as_const, cbegin);
        assert!(begin == cbegin);
        // read-only methods are reachable through deref
        assert_eq!(begin.generation(), 3);
        assert_eq!(unsafe { *begin.get() }, 7);
    }

    #[test]
    fn relational_order_follows_addresses() {
        let mut data = [0; 4];
        let (_, begin) = positions(&mut data, 1);
        let end = begin + 4usize;

        assert!(begin < end);
        assert!(end >= begin + 4usize);
        assert!(begin + 1usize <= begin + 2usize);
        assert!(!(begin > end));
    }

    #[test]
    fn different_generations_are_neither_equal_nor_ordered() {
        let data = [0; 2];
        let ptr = data.as_ptr();
        let old = ConstPosition::new(ptr, 1);
        let new = ConstPosition::new(ptr, 2);

        assert_ne!(old, new);
        assert_eq!(old.partial_cmp(&new), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "different generations")]
    fn distance_across_generations_asserts() {
        let data = [0; 2];
        let ptr = data.as_ptr();
        let old = ConstPosition::new(ptr, 1);
        let new = ConstPosition::new(ptr, 2) + 1usize;
        let _ = new - old;
    }

    #[test]
    fn reverse_position_walks_backwards() {
        let mut data = [1, 2, 3];
        let (begin, _) = positions(&mut data, 0);
        let end = begin + 3usize;

        let rend = ReversePosition::new(begin);
        let mut rev = ReversePosition::new(end);
        let mut seen = vec![];
        while rev != rend {
            seen.push(unsafe { *rev.get() });
            rev.inc();
        }
        assert_eq!(seen, vec![3, 2, 1]);

        let rbegin = ReversePosition::new(end);
        assert!(rbegin < rend);
        assert_eq!(unsafe { *(rbegin + 1).get() }, 2);
        unsafe { *rbegin.get_mut() = 30 };
        assert_eq!(data[2], 30);
    }

    #[test]
    fn zero_sized_slots_have_distinct_addresses() {
        let base = NonNull::<()>::dangling().as_ptr();
        let begin = ConstPosition::new(base as *const (), 0);
        let end = begin + 5usize;

        assert_eq!(end - begin, 5);
        assert!(begin < end);
        assert_eq!(unsafe { *end.get() }, ());
    }
}
