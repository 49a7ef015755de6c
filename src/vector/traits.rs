//! Standard trait implementations for [`Vector`].

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut, Index, IndexMut},
};

use super::{ConstPosition, Position, Vector};
use crate::buff_manager::RawBuffer;

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/////////////////////////////////////////////////////////////
/// Indexing
/////////////////////////////////////////////////////////////

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    /// # Panics
    /// If `index >= len`, even when the slot lies within capacity.
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

// Handle indexing panics with the error `get_at` would return.
impl<T> Index<ConstPosition<T>> for Vector<T> {
    type Output = T;

    fn index(&self, pos: ConstPosition<T>) -> &T {
        match self.get_at(pos) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> Index<Position<T>> for Vector<T> {
    type Output = T;

    fn index(&self, pos: Position<T>) -> &T {
        &self[pos.as_const()]
    }
}

impl<T> IndexMut<Position<T>> for Vector<T> {
    fn index_mut(&mut self, pos: Position<T>) -> &mut T {
        match self.get_at_mut(pos) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Clone> Clone for Vector<T> {
    /// Deep copy into a buffer sized to the source length.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len().max(1));
        out.extend_from_slice(self.as_slice());
        out
    }

    /// Reuses `self`'s buffer when it is large enough.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend_from_slice(source.as_slice());
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/////////////////////////////////////////////////////////////
/// Comparison
/////////////////////////////////////////////////////////////

// Equality: same length and every pair equal, stopping at the first mismatch.
impl<T, U> PartialEq<Vector<U>> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vector<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for Vector<T> {}

// Ordering: the first unequal pair decides; a strict prefix is smaller.
impl<T: PartialOrd> PartialOrd for Vector<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for Vector<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for Vector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

/////////////////////////////////////////////////////////////
/// Construction from other collections
/////////////////////////////////////////////////////////////

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    /// Capacity and length both equal `N`; elements keep their order.
    fn from(items: [T; N]) -> Self {
        let mut out = Self::with_capacity(N);
        for item in items {
            out.push_back(item);
        }
        out
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        let mut out = Self::with_capacity(items.len());
        out.extend_from_slice(items);
        out
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut out = Self::with_capacity(iter.size_hint().0);
        out.extend(iter);
        out
    }
}

impl<T> Extend<T> for Vector<T> {
    /// Grows by the amortised policy, so repeated small extends stay linear.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let result = self.grow_for(lower);
        self.or_abort(result);
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Vector<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/////////////////////////////////////////////////////////////
/// Iteration
/////////////////////////////////////////////////////////////

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Owning iterator returned by `Vector::into_iter`.
///
/// Takes over the vector's buffer; elements not yielded are dropped with it.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    /// Next slot yielded from the front.
    start: usize,
    /// One past the next slot yielded from the back.
    end: usize,
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = ManuallyDrop::new(self);
        let buf = mem::replace(&mut this.buf, RawBuffer::empty());
        IntoIter {
            buf,
            start: 0,
            end: this.len,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let item = unsafe { self.buf.slot(self.start).read() };
        self.start += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { self.buf.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // Mark everything consumed before dropping, so a panicking destructor
        // cannot lead to a second drop.
        let start = mem::replace(&mut self.start, self.end);
        unsafe { self.buf.drop_range(start, remaining) };
    }
}
