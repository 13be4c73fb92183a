//! Owned, element-sized raw buffer. The only module that touches memory
//! through raw pointers.
//!
//! Every byte of the block is initialised: freshly allocated or grown
//! regions are zero-filled before they become reachable, so the block can
//! be viewed as a plain `[u8]` at any time. Each `unsafe` block carries a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use vecbuf_core::{Allocator, ElementLayout, VecError};

#[derive(Clone, Copy)]
struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

/// A block of `capacity * layout.size()` bytes, or no block at all.
pub(crate) struct RawBuffer<A: Allocator> {
    block: Option<Block>,
    capacity: usize,
    layout: ElementLayout,
    alloc: A,
}

// SAFETY: the buffer uniquely owns its block; moving it to another thread
// moves that ownership, exactly like `Vec<u8>`.
unsafe impl<A: Allocator + Send> Send for RawBuffer<A> {}
// SAFETY: `&RawBuffer` only permits reads of the block.
unsafe impl<A: Allocator + Sync> Sync for RawBuffer<A> {}

impl<A: Allocator> RawBuffer<A> {
    pub(crate) fn new_in(layout: ElementLayout, alloc: A) -> Self {
        Self {
            block: None,
            capacity: 0,
            layout,
            alloc,
        }
    }

    pub(crate) fn layout(&self) -> ElementLayout {
        self.layout
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_allocated(&self) -> bool {
        self.block.is_some()
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Start of the block, or null when there is none.
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.block
            .map_or(ptr::null(), |b| b.ptr.as_ptr().cast_const())
    }

    /// Mutable start of the block, or null when there is none.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.block.map_or(ptr::null_mut(), |b| b.ptr.as_ptr())
    }

    /// The whole block, `capacity * size` bytes.
    ///
    /// Callers must only ever store fully initialised bytes through
    /// [`bytes_mut`](Self::bytes_mut) or whole-element byte copies.
    pub(crate) fn bytes(&self) -> &[u8] {
        match self.block {
            None => &[],
            // SAFETY: the block is live for `layout.size()` bytes, every byte
            // is initialised (zero-fill on growth), and `&self` prevents
            // concurrent mutation.
            Some(b) => unsafe { std::slice::from_raw_parts(b.ptr.as_ptr(), b.layout.size()) },
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        match self.block {
            None => &mut [],
            // SAFETY: as in `bytes`, and `&mut self` makes the borrow unique.
            Some(b) => unsafe {
                std::slice::from_raw_parts_mut(b.ptr.as_ptr(), b.layout.size())
            },
        }
    }

    /// Pointer to the first byte of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    pub(crate) fn slot_ptr(&mut self, index: usize) -> *mut u8 {
        assert!(index < self.capacity, "slot {index} out of capacity");
        // SAFETY: index < capacity, so the offset stays inside the block.
        unsafe { self.as_mut_ptr().add(index * self.layout.size()) }
    }

    /// Move elements `[index + 1, len)` down by one slot, overwriting
    /// element `index`. Works on raw bytes, so padding is never read as
    /// `u8`.
    ///
    /// # Panics
    ///
    /// Panics unless `index < len <= capacity`.
    pub(crate) fn shift_down(&mut self, index: usize, len: usize) {
        assert!(index < len && len <= self.capacity, "shift out of bounds");
        let size = self.layout.size();
        let tail = (len - index - 1) * size;
        if tail == 0 {
            return;
        }
        let base = self.as_mut_ptr();
        // SAFETY: both ranges lie within the first `len` elements of the
        // block; `ptr::copy` permits overlap.
        unsafe {
            ptr::copy(base.add((index + 1) * size), base.add(index * size), tail);
        }
    }

    /// Reallocate to exactly `new_capacity` elements.
    ///
    /// Zero releases the block. On failure nothing changes. New bytes are
    /// zero-filled; the surviving prefix is preserved.
    pub(crate) fn resize(&mut self, new_capacity: usize) -> Result<(), VecError> {
        if new_capacity == self.capacity {
            return Ok(());
        }
        if new_capacity == 0 {
            self.release();
            return Ok(());
        }
        if self.layout.size() == 0 {
            return Err(VecError::Destroyed);
        }
        let oom = VecError::OutOfMemory {
            requested: new_capacity,
            element_size: self.layout.size(),
        };
        let new_layout = self.layout.array(new_capacity).ok_or(oom.clone())?;

        let old_bytes = self.block.map_or(0, |b| b.layout.size());
        let ptr = match self.block {
            None => self.alloc.allocate(new_layout),
            // SAFETY: `b` is the live block with its exact layout, and
            // `new_layout` is valid, so its size fits the isize bound.
            Some(b) if new_layout.size() > old_bytes => unsafe {
                self.alloc.grow(b.ptr, b.layout, new_layout.size())
            },
            // SAFETY: as above; 0 < new size < old size.
            Some(b) => unsafe { self.alloc.shrink(b.ptr, b.layout, new_layout.size()) },
        }
        .map_err(|_| oom)?;

        if new_layout.size() > old_bytes {
            // SAFETY: the block now holds `new_layout.size()` bytes, of which
            // `[old_bytes, new_size)` are fresh.
            unsafe {
                ptr.as_ptr()
                    .add(old_bytes)
                    .write_bytes(0, new_layout.size() - old_bytes);
            }
        }

        tracing::trace!(
            from = self.capacity,
            to = new_capacity,
            bytes = new_layout.size(),
            "buffer resized"
        );
        self.block = Some(Block {
            ptr,
            layout: new_layout,
        });
        self.capacity = new_capacity;
        Ok(())
    }

    /// Free the block, if any. Capacity becomes zero.
    pub(crate) fn release(&mut self) {
        if let Some(b) = self.block.take() {
            // SAFETY: the block was produced by `self.alloc` for `b.layout`
            // and `take` guarantees it is freed once.
            unsafe { self.alloc.free(b.ptr, b.layout) };
            tracing::trace!(bytes = b.layout.size(), "buffer released");
        }
        self.capacity = 0;
    }

    /// Release the block and switch to another element layout.
    pub(crate) fn reset(&mut self, layout: ElementLayout) {
        self.release();
        self.layout = layout;
    }
}

impl<A: Allocator> Drop for RawBuffer<A> {
    fn drop(&mut self) {
        self.release();
    }
}
