//! # Vector
//!
//! [`Vector<T>`] is a contiguous, growable sequence container built on a
//! [`RawBuffer<T>`].
//!
//! ## Storage model
//!
//! ```text
//!  slot:  0       len            capacity
//!        [live .. live | uninit .. uninit]
//! ```
//!
//! - Slots `[0, len)` hold live values and are dropped exactly once, either by an
//!   erasing operation or when the vector is dropped.
//! - Slots `[len, capacity)` are reserved and never read or dropped.
//! - Growth follows `capacity + capacity / 2` (at least [`Vector::MIN_GROWTH`] more
//!   slots), which keeps appends amortised `O(1)`.
//! - Relocation on growth is a bitwise move; nothing is cloned and the vacated
//!   source slots are released without running destructors.
//!
//! ## Position handles
//!
//! [`begin`](Vector::begin) / [`end`](Vector::end) and friends issue
//! [`Position`] handles tagged with the current buffer generation. The generation
//! changes on every reallocation and every shifting insert/erase, so checked
//! operations reject handles that outlived their buffer layout with
//! [`VecError::StalePosition`].

pub mod position;
mod traits;

use std::{
    alloc::{Layout, handle_alloc_error},
    mem, slice,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    buff_manager::RawBuffer,
    error::{Result, VecError},
};

pub use position::{ConstPosition, Position, ReversePosition, SlotCursor};
pub use traits::IntoIter;

/// Source of buffer generations, shared by every vector in the process so no two
/// buffer layouts ever carry the same tag.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Contiguous growable sequence container.
pub struct Vector<T> {
    /// Slot storage; owns the allocation.
    buf: RawBuffer<T>,
    /// Number of live elements at the front of `buf`.
    len: usize,
    /// Layout version handed out to position handles.
    generation: u64,
}

/////////////////////////////////////////////////////////////
/// Construction
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Capacity reserved by [`Vector::new`].
    pub const DEFAULT_CAPACITY: usize = 2;

    /// Fewest slots a growth step adds, so a capacity of 0 or 1 still grows.
    pub const MIN_GROWTH: usize = 1;

    /// Creates an empty vector with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY) slots.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty vector with exactly `capacity` slots reserved.
    ///
    /// The length stays `0`; use [`with_len`](Self::with_len) or
    /// [`from_elem`](Self::from_elem) to also populate it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuffer::new(capacity),
            len: 0,
            generation: next_generation(),
        }
    }

    /// Creates a vector that owns no allocation (capacity `0`).
    pub fn unallocated() -> Self {
        Self {
            buf: RawBuffer::empty(),
            len: 0,
            generation: next_generation(),
        }
    }

    /// Creates a vector of `len` default values.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut out = Self::with_capacity(len);
        for _ in 0..len {
            out.push_back(T::default());
        }
        out
    }

    /// Creates a vector of `n` clones of `value`.
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut out = Self::with_capacity(n);
        out.resize(n, value);
        out
    }

    /// Moves the contents out, leaving `self` with no elements and no allocation.
    ///
    /// Handles issued by `self` stay valid for the returned vector.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::unallocated())
    }
}

/////////////////////////////////////////////////////////////
/// Capacity queries
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Number of live elements.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Alias of [`len`](Self::len).
    pub const fn size(&self) -> usize {
        self.len
    }

    /// Number of reserved slots.
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alias of [`is_empty`](Self::is_empty).
    pub const fn empty(&self) -> bool {
        self.len == 0
    }

    /// Current buffer generation; see [`position`].
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/////////////////////////////////////////////////////////////
/// Reallocation
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Capacity after one growth step that must fit `required` slots.
    fn grown_capacity(&self, required: usize) -> usize {
        let cap = self.capacity();
        cap.saturating_add(cap / 2)
            .max(cap.saturating_add(Self::MIN_GROWTH))
            .max(required)
    }

    /// Ensures room for `additional` more elements using the amortised policy.
    fn grow_for(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(VecError::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        self.reallocate(self.grown_capacity(required))
    }

    /// Moves every live element into a fresh buffer of `new_capacity` slots.
    ///
    /// The new buffer is obtained before anything is touched, so on error the
    /// vector is unchanged. When `new_capacity < len` the tail is dropped first.
    fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        let mut fresh = RawBuffer::try_new(new_capacity)?;
        if new_capacity < self.len {
            let excess = self.len - new_capacity;
            log::debug!("shrinking below length: dropping {excess} elements");
            self.len = new_capacity;
            unsafe { self.buf.drop_range(new_capacity, excess) };
        }
        unsafe { self.buf.relocate_into(&mut fresh, 0, self.len) };
        log::trace!(
            "reallocated vector: {} -> {} slots, {} relocated",
            self.capacity(),
            new_capacity,
            self.len
        );
        // The old buffer now holds no live values and only frees its memory.
        self.buf = fresh;
        self.bump_generation();
        Ok(())
    }

    /// Turns a failed growth into the standard allocation-failure path.
    fn or_abort(&self, result: Result<()>) {
        match result {
            Ok(()) => {}
            Err(VecError::AllocFailed { bytes }) => handle_alloc_error(
                Layout::from_size_align(bytes, mem::align_of::<T>())
                    .unwrap_or_else(|_| Layout::new::<T>()),
            ),
            Err(err) => panic!("{err}"),
        }
    }

    fn bump_generation(&mut self) {
        self.generation = next_generation();
    }

    /// Reserves capacity for at least `new_capacity` elements in total.
    ///
    /// Reallocates to exactly `new_capacity` only when it exceeds the current
    /// capacity; smaller requests are a no-op. Never changes the length.
    pub fn reserve(&mut self, new_capacity: usize) {
        let result = self.try_reserve(new_capacity);
        self.or_abort(result);
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.reallocate(new_capacity)
    }

    /// Reallocates down to exactly `new_capacity` slots.
    ///
    /// If `new_capacity < len`, the trailing `len - new_capacity` elements are
    /// dropped and the length is clamped. Requests at or above the current
    /// capacity do nothing.
    pub fn shrink_to(&mut self, new_capacity: usize) {
        if new_capacity >= self.capacity() {
            return;
        }
        let result = self.reallocate(new_capacity);
        self.or_abort(result);
    }

    /// Drops unused capacity.
    pub fn shrink_to_fit(&mut self) {
        self.shrink_to(self.len);
    }
}

/////////////////////////////////////////////////////////////
/// Appending and removing at the end
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Appends `value`. Amortised `O(1)`.
    ///
    /// Handles stay valid unless the append had to reallocate.
    pub fn push_back(&mut self, value: T) {
        self.emplace_back(|| value);
    }

    /// Appends the value built by `make`, written straight into the new slot, and
    /// returns a reference to it.
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let result = self.grow_for(1);
        self.or_abort(result);
        unsafe {
            self.buf.write(self.len, make());
            self.len += 1;
            &mut *self.buf.slot(self.len - 1)
        }
    }

    /// Appends `value`, reporting allocation failure instead of aborting.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        self.grow_for(1)?;
        unsafe { self.buf.write(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// # Panics
    /// If the vector is empty.
    pub fn pop_back(&mut self) -> T {
        match self.try_pop_back() {
            Some(value) => value,
            None => panic!("pop_back on an empty vector"),
        }
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn try_pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Moves every element of `other` onto the end of `self`, leaving `other`
    /// empty with its capacity intact.
    pub fn append(&mut self, other: &mut Self) {
        let count = other.len;
        let result = self.grow_for(count);
        self.or_abort(result);
        unsafe { other.buf.relocate_into(&mut self.buf, self.len, count) };
        other.len = 0;
        self.len += count;
    }

    /// Appends a clone of every element of `items`.
    pub fn extend_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        let result = self.grow_for(items.len());
        self.or_abort(result);
        for item in items {
            unsafe { self.buf.write(self.len, item.clone()) };
            self.len += 1;
        }
    }
}

/////////////////////////////////////////////////////////////
/// Positional insertion and removal
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Inserts `value` before `pos`, shifting `[pos, end)` one slot toward the end.
    ///
    /// Returns a handle to the inserted element under the new generation; every
    /// handle issued earlier becomes stale.
    ///
    /// # Errors
    /// - [`VecError::StalePosition`] / [`VecError::PositionOutOfRange`] if `pos`
    ///   is not a current handle in `[begin, end]`.
    /// - [`VecError::AllocFailed`] / [`VecError::CapacityOverflow`] if growth fails;
    ///   the vector is then unchanged.
    pub fn insert(&mut self, pos: impl Into<ConstPosition<T>>, value: T) -> Result<Position<T>> {
        self.emplace(pos, || value)
    }

    /// Inserts the value built by `make` before `pos`. Same contract as
    /// [`insert`](Self::insert).
    pub fn emplace<F>(&mut self, pos: impl Into<ConstPosition<T>>, make: F) -> Result<Position<T>>
    where
        F: FnOnce() -> T,
    {
        let index = self.index_of(pos.into(), true)?;
        self.grow_for(1)?;
        // Built before the shift so a panicking `make` leaves the layout intact.
        let value = make();
        unsafe {
            self.buf.shift(index, index + 1, self.len - index);
            self.buf.write(index, value);
        }
        self.len += 1;
        self.bump_generation();
        Ok(self.position_at(index))
    }

    /// Inserts `count` clones of `value` before `pos`, shifting the tail by `count`.
    ///
    /// Returns a handle to the first inserted element (or to `pos` if `count == 0`).
    pub fn insert_n(
        &mut self,
        pos: impl Into<ConstPosition<T>>,
        count: usize,
        value: T,
    ) -> Result<Position<T>>
    where
        T: Clone,
    {
        let index = self.index_of(pos.into(), true)?;
        if count == 0 {
            return Ok(self.position_at(index));
        }
        self.grow_for(count)?;

        let old_len = self.len;
        // A panicking clone leaks the shifted tail instead of dropping it twice.
        self.len = index;
        unsafe {
            self.buf.shift(index, index + count, old_len - index);
            for offset in 0..count - 1 {
                self.buf.write(index + offset, value.clone());
            }
            self.buf.write(index + count - 1, value);
        }
        self.len = old_len + count;
        self.bump_generation();
        Ok(self.position_at(index))
    }

    /// Drops the element at `pos` and closes the gap.
    ///
    /// Returns a handle to the element that now occupies `pos` (or `end()`).
    ///
    /// # Errors
    /// [`VecError::StalePosition`] / [`VecError::PositionOutOfRange`] unless `pos`
    /// is a current handle to a live element.
    pub fn erase(&mut self, pos: impl Into<ConstPosition<T>>) -> Result<Position<T>> {
        let index = self.index_of(pos.into(), false)?;
        self.erase_span(index, index + 1);
        Ok(self.position_at(index))
    }

    /// Drops every element in `[first, last)` and shifts the remainder down.
    ///
    /// # Errors
    /// As [`erase`](Self::erase), plus [`VecError::InvalidRange`] if `first > last`.
    pub fn erase_range(
        &mut self,
        first: impl Into<ConstPosition<T>>,
        last: impl Into<ConstPosition<T>>,
    ) -> Result<Position<T>> {
        let first = self.index_of(first.into(), true)?;
        let last = self.index_of(last.into(), true)?;
        if first > last {
            return Err(VecError::InvalidRange { first, last });
        }
        self.erase_span(first, last);
        Ok(self.position_at(first))
    }

    fn erase_span(&mut self, first: usize, last: usize) {
        let count = last - first;
        if count == 0 {
            return;
        }
        let old_len = self.len;
        // A panicking destructor leaks the tail instead of exposing dropped slots.
        self.len = first;
        unsafe {
            self.buf.drop_range(first, count);
            self.buf.shift(last, first, old_len - last);
        }
        self.len = old_len - count;
        self.bump_generation();
    }

    /// Drops every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements past `new_len`. Does nothing if `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let excess = self.len - new_len;
        self.len = new_len;
        unsafe { self.buf.drop_range(new_len, excess) };
    }

    /// Sets the length to `new_len`, dropping the excess tail or appending clones
    /// of `fill`. Growing reserves exactly `new_len` slots if needed.
    pub fn resize(&mut self, new_len: usize, fill: T)
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len + 1 < new_len {
            unsafe { self.buf.write(self.len, fill.clone()) };
            self.len += 1;
        }
        unsafe { self.buf.write(self.len, fill) };
        self.len += 1;
    }

    /// Exchanges contents with `other` in `O(1)`. No element is moved or cloned;
    /// handles keep following their buffer.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl Vector<bool> {
    /// Negates every element.
    pub fn flip(&mut self) {
        for bit in self.as_mut_slice() {
            *bit = !*bit;
        }
    }
}

/////////////////////////////////////////////////////////////
/// Element access
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// First element.
    ///
    /// # Panics
    /// If the vector is empty.
    pub fn front(&self) -> &T {
        assert!(self.len > 0, "front() on an empty vector");
        &self.as_slice()[0]
    }

    /// Last element.
    ///
    /// # Panics
    /// If the vector is empty.
    pub fn back(&self) -> &T {
        assert!(self.len > 0, "back() on an empty vector");
        &self.as_slice()[self.len - 1]
    }

    pub fn front_mut(&mut self) -> &mut T {
        assert!(self.len > 0, "front_mut() on an empty vector");
        &mut self.as_mut_slice()[0]
    }

    pub fn back_mut(&mut self) -> &mut T {
        assert!(self.len > 0, "back_mut() on an empty vector");
        let last = self.len - 1;
        &mut self.as_mut_slice()[last]
    }

    /// Element at `index`, bounds-checked against the length.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(VecError::IndexOutOfBounds { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(VecError::IndexOutOfBounds { index, len })
    }

    /// Element addressed by a position handle, after checking the handle's
    /// generation and range.
    pub fn get_at(&self, pos: impl Into<ConstPosition<T>>) -> Result<&T> {
        let index = self.index_of(pos.into(), false)?;
        Ok(&self.as_slice()[index])
    }

    pub fn get_at_mut(&mut self, pos: impl Into<ConstPosition<T>>) -> Result<&mut T> {
        let index = self.index_of(pos.into(), false)?;
        Ok(&mut self.as_mut_slice()[index])
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }

    /// Base address of the buffer. Dangling (but aligned) when nothing is allocated.
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_ptr()
    }
}

/////////////////////////////////////////////////////////////
/// Position handles
/////////////////////////////////////////////////////////////
impl<T> Vector<T> {
    /// Handle to slot `index` under the current generation.
    fn position_at(&self, index: usize) -> Position<T> {
        debug_assert!(index <= self.len, "handle issued past the end");
        Position::new(self.buf.as_ptr(), self.generation).offset(index as isize)
    }

    /// Resolves a handle to a slot index.
    ///
    /// `allow_end` accepts the one-past-the-end handle (for insertion points and
    /// range bounds).
    fn index_of(&self, pos: ConstPosition<T>, allow_end: bool) -> Result<usize> {
        if pos.generation() != self.generation {
            return Err(VecError::StalePosition {
                issued: pos.generation(),
                current: self.generation,
            });
        }
        let offset = position::distance(pos.as_ptr(), self.as_ptr());
        let in_range = offset >= 0
            && (offset as usize) <= self.len
            && (allow_end || (offset as usize) < self.len);
        if !in_range {
            return Err(VecError::PositionOutOfRange {
                offset,
                len: self.len,
            });
        }
        Ok(offset as usize)
    }

    /// Mutable handle to the first slot.
    ///
    /// Minting a writable handle needs exclusive access. To pass a handle into
    /// another method of the same vector, use [`cbegin`](Self::cbegin) or bind
    /// the handle first.
    pub fn begin(&mut self) -> Position<T> {
        self.position_at(0)
    }

    /// Mutable handle one past the last element.
    pub fn end(&mut self) -> Position<T> {
        self.position_at(self.len)
    }

    pub fn cbegin(&self) -> ConstPosition<T> {
        self.position_at(0).as_const()
    }

    pub fn cend(&self) -> ConstPosition<T> {
        self.position_at(self.len).as_const()
    }

    /// Reverse handle to the last element.
    pub fn rbegin(&mut self) -> ReversePosition<Position<T>> {
        ReversePosition::new(self.end())
    }

    /// Reverse handle one before the first element.
    pub fn rend(&mut self) -> ReversePosition<Position<T>> {
        ReversePosition::new(self.begin())
    }

    pub fn crbegin(&self) -> ReversePosition<ConstPosition<T>> {
        ReversePosition::new(self.cend())
    }

    pub fn crend(&self) -> ReversePosition<ConstPosition<T>> {
        ReversePosition::new(self.cbegin())
    }
}

impl<T> Drop for Vector<T> {
    /// Drops every live element; the buffer then releases its allocation.
    fn drop(&mut self) {
        self.clear();
    }
}
