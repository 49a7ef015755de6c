//! # Raw Buffer
//!
//! Uninitialised, exclusively owned slot storage backing a [`Vector`](crate::Vector).
//!
//! [`RawBuffer`] pairs the global `alloc` / `dealloc` calls in one owner: the
//! allocation is obtained in the constructor and released in [`Drop`], so every
//! exit path frees it exactly once. The buffer never tracks which slots hold a
//! live value; that bookkeeping (and dropping those values) belongs to the caller.

use std::{
    alloc::{Layout, alloc, dealloc, handle_alloc_error},
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ptr::{self, NonNull},
};

use crate::error::{Result, VecError};

/// A contiguous block of `capacity` uninitialised `T` slots.
///
/// A zero capacity, or a zero-sized `T`, never touches the allocator; the base
/// pointer is then dangling but well aligned.
///
/// # Safety
/// All slot accessors are `unsafe`. Callers must keep indices below
/// [`capacity`](Self::capacity) and must know which slots are initialised.
pub struct RawBuffer<T> {
    /// Base of the allocation.
    buff: NonNull<MaybeUninit<T>>,
    /// Number of slots reserved.
    capacity: usize,
    _marker: PhantomData<T>,
}

// SAFETY: `RawBuffer` owns its allocation exactly like `Box<[MaybeUninit<T>]>`.
unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// A buffer with no slots and no allocation.
    pub const fn empty() -> Self {
        Self {
            buff: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates `capacity` slots, aborting through [`handle_alloc_error`] if the
    /// allocator fails.
    ///
    /// # Panics
    /// If `capacity` slots of `T` exceed `isize::MAX` bytes.
    pub fn new(capacity: usize) -> Self {
        let layout = match Self::layout(capacity) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        };
        match Self::try_new(capacity) {
            Ok(buff) => buff,
            Err(_) => handle_alloc_error(layout),
        }
    }

    /// Allocates `capacity` slots.
    ///
    /// # Errors
    /// - [`VecError::CapacityOverflow`] if the layout cannot be represented.
    /// - [`VecError::AllocFailed`] if the global allocator returns null.
    pub fn try_new(capacity: usize) -> Result<Self> {
        let layout = Self::layout(capacity)?;
        if layout.size() == 0 {
            return Ok(Self {
                buff: NonNull::dangling(),
                capacity,
                _marker: PhantomData,
            });
        }
        let raw = unsafe { alloc(layout) as *mut MaybeUninit<T> };
        let buff = NonNull::new(raw).ok_or_else(|| {
            log::debug!("allocator refused {} bytes", layout.size());
            VecError::AllocFailed {
                bytes: layout.size(),
            }
        })?;
        Ok(Self {
            buff,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Returns the memory layout for `capacity` slots of `MaybeUninit<T>`.
    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<MaybeUninit<T>>(capacity).map_err(|_| VecError::CapacityOverflow)
    }

    /// Number of slots reserved.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this buffer owns an allocation that [`Drop`] must release.
    pub fn is_allocated(&self) -> bool {
        self.capacity != 0 && !Self::IS_ZST
    }

    /// Base pointer of the slot array.
    pub const fn as_ptr(&self) -> *mut T {
        self.buff.as_ptr() as *mut T
    }

    /// Pointer to slot `idx`.
    ///
    /// # Safety
    /// `idx <= capacity` (one past the end is allowed for address computation).
    pub const unsafe fn slot(&self, idx: usize) -> *mut T {
        unsafe { self.as_ptr().add(idx) }
    }

    /// Writes `value` into slot `idx` without dropping what was there.
    ///
    /// # Safety
    /// - `idx < capacity`.
    /// - The slot must be uninitialised, or its old value already moved out.
    pub unsafe fn write(&self, idx: usize, value: T) {
        unsafe { self.slot(idx).write(value) }
    }

    /// Moves the bytes of `count` slots from `src` to `dst` within this buffer.
    /// The ranges may overlap.
    ///
    /// # Safety
    /// - `src + count` and `dst + count` must both be `<= capacity`.
    /// - Afterwards the caller must treat vacated source slots as uninitialised.
    pub unsafe fn shift(&self, src: usize, dst: usize, count: usize) {
        unsafe { ptr::copy(self.slot(src), self.slot(dst), count) }
    }

    /// Moves the first `count` slots of `self` into `dst`, starting at slot `at`.
    ///
    /// # Safety
    /// - `count <= self.capacity` and `at + count <= dst.capacity`.
    /// - The destination slots must be uninitialised.
    /// - The moved-from slots of `self` become logically uninitialised.
    pub unsafe fn relocate_into(&self, dst: &mut RawBuffer<T>, at: usize, count: usize) {
        unsafe { ptr::copy_nonoverlapping(self.as_ptr(), dst.slot(at), count) }
    }

    /// Drops the values in slots `[start, start + count)` in place.
    ///
    /// # Safety
    /// Every slot in the range must be initialised, and must not be used again
    /// until rewritten.
    pub unsafe fn drop_range(&self, start: usize, count: usize) {
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.slot(start), count);
            ptr::drop_in_place(tail);
        }
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // The same layout was accepted by `try_new`.
        if let Ok(layout) = Self::layout(self.capacity) {
            unsafe { dealloc(self.buff.as_ptr() as *mut u8, layout) }
        }
    }
}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.buff)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn write_and_read_slots() {
        let buff = RawBuffer::<u32>::new(4);
        assert_eq!(buff.capacity(), 4);
        assert!(buff.is_allocated());

        unsafe {
            for i in 0..4 {
                buff.write(i, 10 + i as u32);
            }
            for i in 0..4 {
                assert_eq!(*buff.slot(i), 10 + i as u32);
            }
        }
    }

    #[test]
    fn empty_buffer_has_no_allocation() {
        let buff = RawBuffer::<String>::empty();
        assert_eq!(buff.capacity(), 0);
        assert!(!buff.is_allocated());

        let zero = RawBuffer::<String>::new(0);
        assert!(!zero.is_allocated());
    }

    #[test]
    fn zero_sized_type_never_allocates() {
        let buff = RawBuffer::<()>::new(1_000);
        assert_eq!(buff.capacity(), 1_000);
        assert!(!buff.is_allocated());
    }

    #[test]
    fn oversized_request_reports_overflow() {
        let err = RawBuffer::<u64>::try_new(usize::MAX).unwrap_err();
        assert_eq!(err, VecError::CapacityOverflow);
    }

    #[test]
    fn shift_handles_overlap() {
        let buff = RawBuffer::<u32>::new(5);
        unsafe {
            for i in 0..4 {
                buff.write(i, i as u32);
            }
            // open a hole at 1
            buff.shift(1, 2, 3);
            buff.write(1, 99);
            let got: Vec<u32> = (0..5).map(|i| *buff.slot(i)).collect();
            assert_eq!(got, vec![0, 99, 1, 2, 3]);
        }
    }

    #[test]
    fn relocate_moves_without_cloning() {
        let src = RawBuffer::<String>::new(2);
        let mut dst = RawBuffer::<String>::new(3);
        unsafe {
            src.write(0, "a".to_string());
            src.write(1, "b".to_string());
            src.relocate_into(&mut dst, 0, 2);
            assert_eq!(&*dst.slot(0), "a");
            assert_eq!(&*dst.slot(1), "b");
            dst.drop_range(0, 2);
        }
        // `src` slots are now logically uninitialised; dropping `src` frees only memory.
    }

    #[test]
    fn drop_range_calls_destructors() {
        struct Tracker<'a> {
            dropped: &'a Cell<u32>,
        }

        impl Drop for Tracker<'_> {
            fn drop(&mut self) {
                self.dropped.set(self.dropped.get() + 1);
            }
        }

        let dropped = Cell::new(0);
        let buff = RawBuffer::new(3);
        unsafe {
            for i in 0..3 {
                buff.write(i, Tracker { dropped: &dropped });
            }
            buff.drop_range(1, 2);
            assert_eq!(dropped.get(), 2);
            buff.drop_range(0, 1);
        }
        drop(buff);
        assert_eq!(dropped.get(), 3, "releasing the buffer must not drop slots");
    }
}
