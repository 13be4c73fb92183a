//! Compile-time typed vector over the same storage and growth policy.
//!
//! `T: Copy` keeps the byte-copy semantics of [`ByteVec`]: removing,
//! popping or clearing never has a destructor to run.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use vecbuf_core::{Allocator, ElementLayout, Heap, VecError};

use crate::bytes::ByteVec;

/// A growable contiguous array of `T`, sharing [`ByteVec`]'s capacity
/// rules: exact `reserve`, doubling `push`, `shrink` to length (or to
/// nothing when empty), and no mutation on failure.
///
/// Zero-sized `T` is rejected at compile time.
pub struct TypedVec<T: Copy, A: Allocator = Heap> {
    inner: ByteVec<A>,
    _marker: PhantomData<T>,
}

impl<T: Copy> TypedVec<T, Heap> {
    /// Create an empty vector. Nothing is allocated.
    pub fn new() -> Self {
        Self::new_in(Heap)
    }
}

impl<T: Copy> Default for TypedVec<T, Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, A: Allocator> TypedVec<T, A> {
    /// Create an empty vector drawing memory from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        const {
            assert!(
                std::mem::size_of::<T>() != 0,
                "TypedVec does not support zero-sized element types"
            )
        };
        Self {
            inner: ByteVec::from_layout_in(ElementLayout::of::<T>(), alloc),
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of elements that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Whether a buffer is allocated.
    pub fn has_buffer(&self) -> bool {
        self.inner.has_buffer()
    }

    /// The allocator backing this vector.
    pub fn allocator(&self) -> &A {
        self.inner.allocator()
    }

    /// See [`ByteVec::reserve`].
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), VecError> {
        self.inner.reserve(new_capacity)
    }

    /// See [`ByteVec::shrink`].
    pub fn shrink(&mut self) {
        self.inner.shrink();
    }

    /// Append `value`, returning a reference to the stored copy.
    pub fn push(&mut self, value: T) -> Result<&mut T, VecError> {
        self.inner.reserve_slot()?;
        let index = self.inner.len();
        let slot = self.inner.raw_mut().slot_ptr(index).cast::<T>();
        // SAFETY: `reserve_slot` guarantees index < capacity; the block is
        // aligned for `ElementLayout::of::<T>()` and each slot is
        // `size_of::<T>()` bytes, so `slot` is valid and aligned for `T`.
        unsafe { slot.write(value) };
        self.inner.set_len(index + 1);
        // SAFETY: just initialised; the borrow is tied to `&mut self`.
        Ok(unsafe { &mut *slot })
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        let value = self.back().copied();
        self.inner.pop();
        value
    }

    /// Remove all elements, keeping the buffer.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Remove element `index`, shifting later elements down. `None` if out
    /// of range.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let value = *self.get(index)?;
        self.inner.remove(index);
        Some(value)
    }

    /// Element `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Element `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// The last element.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        let len = self.inner.len();
        if len == 0 {
            return &[];
        }
        // SAFETY: len > 0 implies an allocated, `T`-aligned block whose
        // first `len` slots were written by `push` (possibly moved by
        // `remove`, which copies whole elements).
        unsafe { std::slice::from_raw_parts(self.inner.raw().as_ptr().cast::<T>(), len) }
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.inner.len();
        if len == 0 {
            return &mut [];
        }
        // SAFETY: as in `as_slice`; `&mut self` makes the borrow unique.
        unsafe {
            std::slice::from_raw_parts_mut(self.inner.raw_mut().as_mut_ptr().cast::<T>(), len)
        }
    }

    /// Iterate over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Pointer to the first element, or null without a buffer.
    pub fn begin(&self) -> *const T {
        self.inner.raw().as_ptr().cast()
    }

    /// One past the last element, or null without a buffer.
    pub fn end(&self) -> *const T {
        let begin = self.begin();
        if begin.is_null() {
            return ptr::null();
        }
        begin.wrapping_add(self.len())
    }

    /// Release the buffer and reset the vector. Safe to call repeatedly;
    /// afterwards `push` fails with [`VecError::Destroyed`].
    pub fn destroy(&mut self) {
        self.inner.destroy();
    }
}

impl<'a, T: Copy, A: Allocator> IntoIterator for &'a TypedVec<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Copy + fmt::Debug, A: Allocator> fmt::Debug for TypedVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
