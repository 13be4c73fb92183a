//! Type-erased vector of fixed-size byte elements.

use std::fmt;
use std::ops::Range;
use std::ptr;

use vecbuf_core::{Allocator, ElementLayout, Heap, VecError};

use crate::iter::Iter;
use crate::raw::RawBuffer;

/// A growable contiguous array of `element_size`-byte elements.
///
/// Elements are opaque byte blocks: they are copied in on [`push`] and
/// never constructed, moved or dropped individually. `pop`, `clear` and
/// `remove` only adjust the length (and shift bytes for `remove`).
///
/// Views returned by [`push`], [`at`], [`back`] and [`iter`] borrow the
/// vector, so they cannot outlive the next mutation. The raw pointers from
/// [`begin`] and [`end`] carry the same rule as a caller obligation.
///
/// Capacity grows 0, 1, 2, 4, 8, ... on push. Failing operations leave the
/// vector exactly as it was.
///
/// [`push`]: ByteVec::push
/// [`at`]: ByteVec::at
/// [`back`]: ByteVec::back
/// [`iter`]: ByteVec::iter
/// [`begin`]: ByteVec::begin
/// [`end`]: ByteVec::end
pub struct ByteVec<A: Allocator = Heap> {
    buf: RawBuffer<A>,
    len: usize,
}

impl ByteVec<Heap> {
    /// Create an empty vector of `element_size`-byte elements.
    ///
    /// Nothing is allocated. Fails with [`VecError::ZeroSizedElement`] if
    /// `element_size` is zero.
    pub fn new(element_size: usize) -> Result<Self, VecError> {
        Self::new_in(element_size, Heap)
    }

    /// Create an empty vector with an explicit element layout.
    ///
    /// Fails with [`VecError::ZeroSizedElement`] for a zero-size layout,
    /// such as `ElementLayout::of::<()>()`.
    pub fn with_layout(layout: ElementLayout) -> Result<Self, VecError> {
        Self::with_layout_in(layout, Heap)
    }
}

impl<A: Allocator> ByteVec<A> {
    /// Like [`ByteVec::new`], drawing memory from `alloc`.
    pub fn new_in(element_size: usize, alloc: A) -> Result<Self, VecError> {
        Ok(Self::from_layout_in(ElementLayout::new(element_size)?, alloc))
    }

    /// Like [`ByteVec::with_layout`], drawing memory from `alloc`.
    pub fn with_layout_in(layout: ElementLayout, alloc: A) -> Result<Self, VecError> {
        if layout.size() == 0 {
            return Err(VecError::ZeroSizedElement);
        }
        Ok(Self::from_layout_in(layout, alloc))
    }

    /// Build without checking the layout; callers guarantee a non-zero size.
    pub(crate) fn from_layout_in(layout: ElementLayout, alloc: A) -> Self {
        debug_assert!(layout.size() != 0);
        Self {
            buf: RawBuffer::new_in(layout, alloc),
            len: 0,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the buffer holds without reallocating.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Byte size of one element; zero after [`destroy`](Self::destroy).
    pub fn element_size(&self) -> usize {
        self.buf.layout().size()
    }

    /// The element layout this vector was built with.
    pub fn layout(&self) -> ElementLayout {
        self.buf.layout()
    }

    /// Whether a buffer is currently allocated (`capacity > 0`).
    pub fn has_buffer(&self) -> bool {
        self.buf.is_allocated()
    }

    /// The allocator backing this vector.
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Ensure room for at least `new_capacity` elements in total.
    ///
    /// Grows to exactly `new_capacity`; a smaller or equal request is a
    /// no-op. Fails with [`VecError::OutOfMemory`] if the byte size
    /// overflows or the allocator refuses, leaving the vector unchanged.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), VecError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.buf.resize(new_capacity).inspect_err(|e| {
            tracing::warn!(
                capacity = self.buf.capacity(),
                requested = new_capacity,
                element_size = self.element_size(),
                error = %e,
                "reserve failed"
            );
        })
    }

    /// Fit the capacity to the length.
    ///
    /// An empty vector releases its buffer entirely. Otherwise the buffer
    /// is reallocated to exactly `len` elements; if that fails the vector
    /// keeps its current buffer and the failure is only logged.
    pub fn shrink(&mut self) {
        if self.len == 0 {
            self.buf.release();
            return;
        }
        if let Err(e) = self.buf.resize(self.len) {
            tracing::warn!(
                capacity = self.buf.capacity(),
                len = self.len,
                error = %e,
                "shrink failed, keeping current buffer"
            );
        }
    }

    /// Append a copy of `element`, returning the slot it was written to.
    ///
    /// `element` must be exactly [`element_size`](Self::element_size)
    /// bytes. Grows the buffer when full; on failure the vector is
    /// unchanged.
    pub fn push(&mut self, element: &[u8]) -> Result<&mut [u8], VecError> {
        let size = self.element_size();
        if size == 0 {
            return Err(VecError::Destroyed);
        }
        if element.len() != size {
            return Err(VecError::ElementSizeMismatch {
                expected: size,
                actual: element.len(),
            });
        }
        self.reserve_slot()?;

        let start = self.len * size;
        self.len += 1;
        let slot = &mut self.buf.bytes_mut()[start..start + size];
        slot.copy_from_slice(element);
        Ok(slot)
    }

    /// Make sure one more element fits, doubling the capacity if full.
    pub(crate) fn reserve_slot(&mut self) -> Result<(), VecError> {
        let capacity = self.capacity();
        if self.len < capacity {
            return Ok(());
        }
        let element_size = self.element_size();
        let new_capacity = if capacity == 0 {
            1
        } else {
            match capacity.checked_mul(2) {
                Some(doubled) => doubled,
                None => {
                    tracing::warn!(capacity, element_size, "push capacity overflow");
                    return Err(VecError::OutOfMemory {
                        requested: usize::MAX,
                        element_size,
                    });
                }
            }
        };
        self.buf.resize(new_capacity).inspect_err(|e| {
            tracing::warn!(
                capacity,
                requested = new_capacity,
                element_size,
                error = %e,
                "push failed to grow buffer"
            );
        })
    }

    /// Drop the last element, if any. Its bytes stay in the buffer.
    pub fn pop(&mut self) {
        if self.len > 0 {
            self.len -= 1;
        }
    }

    /// Drop all elements, keeping the buffer and its capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Remove element `index`, shifting later elements down by one.
    ///
    /// Returns `false` (and changes nothing) if `index >= len`.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.buf.shift_down(index, self.len);
        self.len -= 1;
        true
    }

    /// Element `index`, or `None` when out of range.
    pub fn at(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len {
            return None;
        }
        let size = self.element_size();
        Some(&self.buf.bytes()[index * size..(index + 1) * size])
    }

    /// Mutable element `index`, or `None` when out of range.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len {
            return None;
        }
        let size = self.element_size();
        Some(&mut self.buf.bytes_mut()[index * size..(index + 1) * size])
    }

    /// The last element, or `None` when empty.
    pub fn back(&self) -> Option<&[u8]> {
        self.len.checked_sub(1).and_then(|i| self.at(i))
    }

    /// The last element, mutably.
    pub fn back_mut(&mut self) -> Option<&mut [u8]> {
        self.len.checked_sub(1).and_then(move |i| self.at_mut(i))
    }

    /// The live elements as one contiguous byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.bytes()[..self.len * self.element_size()]
    }

    /// The live elements as one contiguous mutable byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let end = self.len * self.element_size();
        &mut self.buf.bytes_mut()[..end]
    }

    /// Iterate over the live elements in index order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.as_bytes(), self.element_size())
    }

    /// `[begin, end)` over the live elements; null..null with no buffer.
    pub fn as_ptr_range(&self) -> Range<*const u8> {
        if !self.has_buffer() {
            return ptr::null()..ptr::null();
        }
        self.as_bytes().as_ptr_range()
    }

    /// Mutable `[begin, end)`; null..null with no buffer.
    pub fn as_mut_ptr_range(&mut self) -> Range<*mut u8> {
        if !self.has_buffer() {
            return ptr::null_mut()..ptr::null_mut();
        }
        self.as_bytes_mut().as_mut_ptr_range()
    }

    /// `[begin, begin + capacity * element_size)`: the whole allocated
    /// block, spare slots included. null..null with no buffer.
    pub fn buffer_ptr_range(&self) -> Range<*const u8> {
        let start = self.buf.as_ptr();
        if start.is_null() {
            return ptr::null()..ptr::null();
        }
        start..start.wrapping_add(self.capacity() * self.element_size())
    }

    /// Pointer to the first element, or null if no buffer is allocated.
    ///
    /// Invalidated by any operation that changes the length or capacity.
    pub fn begin(&self) -> *const u8 {
        self.as_ptr_range().start
    }

    /// One past the last element (`begin + len * element_size`), or null
    /// if no buffer is allocated. Equals [`begin`](Self::begin) when empty.
    pub fn end(&self) -> *const u8 {
        self.as_ptr_range().end
    }

    /// Release the buffer and reset length, capacity and element size to
    /// zero. Safe to call repeatedly.
    ///
    /// Afterwards `push` and growing `reserve` fail with
    /// [`VecError::Destroyed`]; build a new vector to continue.
    pub fn destroy(&mut self) {
        self.buf.reset(ElementLayout::destroyed());
        self.len = 0;
    }

    pub(crate) fn raw(&self) -> &RawBuffer<A> {
        &self.buf
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawBuffer<A> {
        &mut self.buf
    }

    /// Set the length after writing slot `len - 1` directly.
    pub(crate) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        self.len = len;
    }
}

impl<'a, A: Allocator> IntoIterator for &'a ByteVec<A> {
    type Item = &'a [u8];
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<A: Allocator> fmt::Debug for ByteVec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteVec")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("element_size", &self.element_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecbuf_test_utils::{CountingAllocator, FailingAllocator};

    fn ints(values: &[i32]) -> ByteVec {
        let mut v = ByteVec::new(4).unwrap();
        for x in values {
            v.push(&x.to_ne_bytes()).unwrap();
        }
        v
    }

    fn read_ints(v: &ByteVec) -> Vec<i32> {
        v.iter()
            .map(|b| i32::from_ne_bytes(b.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn new_allocates_nothing() {
        let v = ByteVec::new(4).unwrap();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
        assert_eq!(v.element_size(), 4);
        assert!(!v.has_buffer());
    }

    #[test]
    fn zero_element_size_rejected() {
        assert_eq!(ByteVec::new(0).unwrap_err(), VecError::ZeroSizedElement);
    }

    #[test]
    fn zero_size_layout_rejected() {
        assert_eq!(
            ByteVec::with_layout(ElementLayout::of::<()>()).unwrap_err(),
            VecError::ZeroSizedElement
        );
        assert_eq!(
            ByteVec::with_layout_in(ElementLayout::destroyed(), Heap).unwrap_err(),
            VecError::ZeroSizedElement
        );
        let v = ByteVec::with_layout(ElementLayout::of::<u64>()).unwrap();
        assert_eq!(v.element_size(), 8);
    }

    #[test]
    fn buffer_range_covers_spare_slots() {
        let empty = ByteVec::new(4).unwrap();
        assert!(empty.buffer_ptr_range().start.is_null());

        let mut v = ints(&[1, 2, 3]);
        v.pop();
        let block = v.buffer_ptr_range();
        assert_eq!(block.start, v.begin());
        assert_eq!(block.end as usize - block.start as usize, 4 * 4);
        assert!(v.end() < block.end);
    }

    #[test]
    fn push_returns_written_slot() {
        let mut v = ByteVec::new(2).unwrap();
        let slot = v.push(&[7, 9]).unwrap();
        assert_eq!(slot, &[7, 9]);
        slot[0] = 8;
        assert_eq!(v.at(0), Some(&[8u8, 9][..]));
    }

    #[test]
    fn push_wrong_length_rejected() {
        let mut v = ByteVec::new(4).unwrap();
        assert_eq!(
            v.push(&[1, 2]).unwrap_err(),
            VecError::ElementSizeMismatch {
                expected: 4,
                actual: 2
            }
        );
        assert_eq!(v.len(), 0);
        assert!(!v.has_buffer());
    }

    #[test]
    fn capacity_doubles_on_push() {
        let mut v = ByteVec::new(4).unwrap();
        let mut seen = vec![v.capacity()];
        for i in 0..9i32 {
            v.push(&i.to_ne_bytes()).unwrap();
            if *seen.last().unwrap() != v.capacity() {
                seen.push(v.capacity());
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 4, 8, 16]);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut v = ByteVec::new(4).unwrap();
        v.pop();
        v.pop();
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn pop_keeps_capacity() {
        let mut v = ints(&[1, 2, 3]);
        v.pop();
        assert_eq!(read_ints(&v), vec![1, 2]);
        assert_eq!(v.capacity(), 4);
    }

    #[test]
    fn remove_preserves_order() {
        let mut v = ints(&[0, 1, 2, 3, 4]);
        assert!(v.remove(0));
        assert_eq!(read_ints(&v), vec![1, 2, 3, 4]);
        assert!(v.remove(2));
        assert_eq!(read_ints(&v), vec![1, 2, 4]);
        assert!(v.remove(2));
        assert_eq!(read_ints(&v), vec![1, 2]);
    }

    #[test]
    fn remove_out_of_range_is_false() {
        let mut v = ints(&[1]);
        assert!(!v.remove(1));
        assert!(!v.remove(usize::MAX));
        assert_eq!(read_ints(&v), vec![1]);
    }

    #[test]
    fn clear_keeps_buffer_shrink_releases_it() {
        let mut v = ints(&[1, 2, 3]);
        v.clear();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 4);
        assert!(v.has_buffer());

        v.shrink();
        assert_eq!(v.capacity(), 0);
        assert!(!v.has_buffer());
    }

    #[test]
    fn shrink_fits_length() {
        let mut v = ints(&[1, 2, 3, 4, 5]);
        assert_eq!(v.capacity(), 8);
        v.shrink();
        assert_eq!(v.capacity(), 5);
        assert_eq!(read_ints(&v), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn push_after_shrink() {
        let mut v = ByteVec::new(1).unwrap();
        for c in b"abcdef" {
            v.push(&[*c]).unwrap();
        }
        v.pop();
        v.pop();
        v.shrink();
        v.push(b"g").unwrap();
        assert_eq!(v.len(), 5);
        assert_eq!(v.back(), Some(&b"g"[..]));
        assert_eq!(v.as_bytes(), b"abcdg");
    }

    #[test]
    fn reserve_is_exact_and_monotonic() {
        let mut v = ByteVec::new(4).unwrap();
        v.reserve(100).unwrap();
        assert_eq!(v.capacity(), 100);
        assert_eq!(v.len(), 0);
        v.reserve(10).unwrap();
        assert_eq!(v.capacity(), 100);
    }

    #[test]
    fn reserve_overflow_leaves_vector_unchanged() {
        let mut v = ByteVec::new(8).unwrap();
        v.push(&[1; 8]).unwrap();
        let before = (v.len(), v.capacity(), v.begin(), v.as_bytes().to_vec());

        let err = v.reserve(usize::MAX / 8 + 1).unwrap_err();
        assert!(matches!(err, VecError::OutOfMemory { .. }));
        assert_eq!(
            (v.len(), v.capacity(), v.begin(), v.as_bytes().to_vec()),
            before
        );
    }

    #[test]
    fn push_failure_leaves_vector_unchanged() {
        let failing = FailingAllocator::new();
        let mut v = ByteVec::new_in(4, &failing).unwrap();
        for i in 0..4i32 {
            v.push(&i.to_ne_bytes()).unwrap();
        }
        failing.fail_all();

        let err = v.push(&4i32.to_ne_bytes()).unwrap_err();
        assert_eq!(
            err,
            VecError::OutOfMemory {
                requested: 8,
                element_size: 4
            }
        );
        assert_eq!(v.len(), 4);
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.at(3), Some(&3i32.to_ne_bytes()[..]));
    }

    #[test]
    fn shrink_failure_is_absorbed() {
        let failing = FailingAllocator::new();
        let mut v = ByteVec::new_in(1, &failing).unwrap();
        for c in b"abc" {
            v.push(&[*c]).unwrap();
        }
        assert_eq!(v.capacity(), 4);
        failing.fail_all();
        v.shrink();
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.as_bytes(), b"abc");
    }

    #[test]
    fn accessors_on_empty() {
        let v = ByteVec::new(4).unwrap();
        assert_eq!(v.at(0), None);
        assert_eq!(v.back(), None);
        assert_eq!(v.begin(), v.end());
        assert!(v.begin().is_null());
        assert_eq!(v.iter().count(), 0);
    }

    #[test]
    fn begin_end_span_live_elements() {
        let mut v = ints(&[1, 2, 3]);
        assert_eq!(v.end() as usize - v.begin() as usize, 12);
        v.clear();
        assert!(!v.begin().is_null());
        assert_eq!(v.begin(), v.end());
    }

    #[test]
    fn iteration_sums_elements() {
        let v = ints(&[1, 2, 3, 4, 5]);
        assert_eq!(read_ints(&v).iter().sum::<i32>(), 15);
        let last = (&v).into_iter().next_back().unwrap();
        assert_eq!(last, &5i32.to_ne_bytes());
    }

    #[test]
    fn large_elements_round_trip() {
        let mut v = ByteVec::new(132).unwrap();
        let mut a = [0xAAu8; 132];
        a[128..].copy_from_slice(&42i32.to_ne_bytes());
        let mut b = [0xBBu8; 132];
        b[128..].copy_from_slice(&7i32.to_ne_bytes());
        v.push(&a).unwrap();
        v.push(&b).unwrap();
        assert_eq!(v.at(0), Some(&a[..]));
        assert_eq!(v.back(), Some(&b[..]));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let counting = CountingAllocator::new();
        let mut v = ByteVec::new_in(4, &counting).unwrap();
        v.push(&[0; 4]).unwrap();
        v.destroy();
        assert_eq!(counting.live_bytes(), 0);
        assert_eq!((v.len(), v.capacity(), v.element_size()), (0, 0, 0));
        v.destroy();
        assert_eq!((v.len(), v.capacity(), v.element_size()), (0, 0, 0));
        assert!(!v.has_buffer());
        assert_eq!(counting.frees(), 1);
    }

    #[test]
    fn destroyed_vector_rejects_growth() {
        let mut v = ints(&[1]);
        v.destroy();
        assert_eq!(v.push(&[]).unwrap_err(), VecError::Destroyed);
        assert_eq!(v.reserve(4).unwrap_err(), VecError::Destroyed);
        assert!(v.reserve(0).is_ok());
        assert_eq!(v.iter().count(), 0);
    }

    #[test]
    fn debug_shows_dimensions() {
        let v = ints(&[1, 2, 3]);
        assert_eq!(
            format!("{v:?}"),
            "ByteVec { len: 3, capacity: 4, element_size: 4 }"
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn len_never_exceeds_capacity(ops in proptest::collection::vec(0u8..5, 0..200)) {
                let mut v = ByteVec::new(3).unwrap();
                for op in ops {
                    match op {
                        0 | 1 => { v.push(&[op; 3]).unwrap(); }
                        2 => v.pop(),
                        3 => v.shrink(),
                        _ => { v.remove(0); }
                    }
                    prop_assert!(v.len() <= v.capacity());
                    prop_assert_eq!(v.capacity() == 0, !v.has_buffer());
                }
            }

            #[test]
            fn remove_matches_std_vec(
                values in proptest::collection::vec(any::<u16>(), 1..64),
                index in any::<prop::sample::Index>(),
            ) {
                let mut v = ByteVec::new(2).unwrap();
                for x in &values {
                    v.push(&x.to_ne_bytes()).unwrap();
                }
                let i = index.index(values.len());
                let mut expected = values.clone();
                expected.remove(i);
                prop_assert!(v.remove(i));
                let got: Vec<u16> = v
                    .iter()
                    .map(|b| u16::from_ne_bytes([b[0], b[1]]))
                    .collect();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
