//! The raw-memory collaborator vectors are built on.
//!
//! An [`Allocator`] hands out, resizes and frees untyped byte blocks. It
//! never sees element counts; the vector turns capacities into [`Layout`]s
//! through [`ElementLayout::array`](crate::ElementLayout::array) first.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::AllocError;

/// Source of raw memory for a vector's buffer.
///
/// All requests have a non-zero size; vectors with no capacity hold no
/// block at all rather than a zero-sized one.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`, and that stay
/// valid until passed to [`grow`](Allocator::grow),
/// [`shrink`](Allocator::shrink) or [`free`](Allocator::free). On failure
/// a resize must leave the original block untouched and still owned by
/// the caller.
pub unsafe trait Allocator {
    /// Allocate a block for `layout`. Contents are unspecified.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Enlarge a block to `new_size` bytes, keeping its first
    /// `old.size()` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `old`, and
    /// `new_size >= old.size()`. `new_size` rounded up to `old.align()`
    /// must not exceed `isize::MAX`.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Reduce a block to `new_size` bytes, keeping its first `new_size` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `old`, and
    /// `0 < new_size <= old.size()`.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `layout` and
    /// must not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide global allocator (`std::alloc`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: every method forwards to `std::alloc`, which upholds the
// trait's contract for the non-zero layouts we are given.
unsafe impl Allocator for Heap {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized allocation request");
        // SAFETY: layout has a non-zero size per the trait contract.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new_size >= old.size());
        // SAFETY: ptr/old come from `allocate` or a previous resize, and the
        // caller guarantees the rounded size fits in isize.
        let ptr = unsafe { std::alloc::realloc(ptr.as_ptr(), old, new_size) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(new_size > 0 && new_size <= old.size());
        // SAFETY: as for `grow`; a smaller size is always representable.
        let ptr = unsafe { std::alloc::realloc(ptr.as_ptr(), old, new_size) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller passes a live block together with its layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: a shared reference forwards to the same allocator instance, so
// blocks stay owned by the allocator that produced them.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded contract.
        unsafe { (**self).grow(ptr, old, new_size) }
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded contract.
        unsafe { (**self).shrink(ptr, old, new_size) }
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).free(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_round_trip_keeps_prefix() {
        let heap = Heap;
        let layout = Layout::from_size_align(8, 4).unwrap();
        let ptr = heap.allocate(layout).unwrap();
        // SAFETY: the block is 8 bytes and exclusively ours.
        unsafe {
            ptr.as_ptr().copy_from_nonoverlapping([1u8, 2, 3, 4, 5, 6, 7, 8].as_ptr(), 8);
            let grown = heap.grow(ptr, layout, 32).unwrap();
            assert_eq!(std::slice::from_raw_parts(grown.as_ptr(), 8), &[1, 2, 3, 4, 5, 6, 7, 8]);
            let big = Layout::from_size_align(32, 4).unwrap();
            let shrunk = heap.shrink(grown, big, 4).unwrap();
            assert_eq!(std::slice::from_raw_parts(shrunk.as_ptr(), 4), &[1, 2, 3, 4]);
            heap.free(shrunk, Layout::from_size_align(4, 4).unwrap());
        }
    }

    #[test]
    fn heap_respects_alignment() {
        let layout = Layout::from_size_align(64, 16).unwrap();
        let ptr = Heap.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 16, 0);
        // SAFETY: allocated above with the same layout.
        unsafe { Heap.free(ptr, layout) };
    }

    #[test]
    fn reference_forwards() {
        let heap = Heap;
        let by_ref = &heap;
        let layout = Layout::from_size_align(4, 4).unwrap();
        let ptr = by_ref.allocate(layout).unwrap();
        // SAFETY: allocated above with the same layout.
        unsafe { by_ref.free(ptr, layout) };
    }
}
