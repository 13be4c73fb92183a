//! Heap-forwarding allocators with fault injection and accounting.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use vecbuf_core::{AllocError, Allocator, Heap};

/// Forwards to [`Heap`] until a failure mode is switched on.
///
/// Only `allocate`, `grow` and `shrink` can fail; `free` always succeeds
/// so vectors can be torn down after a simulated outage.
#[derive(Debug, Default)]
pub struct FailingAllocator {
    failing: Cell<bool>,
    /// Successful requests left before `failing` flips on.
    budget: Cell<Option<usize>>,
}

impl FailingAllocator {
    /// A healthy allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request from now on.
    pub fn fail_all(&self) {
        self.failing.set(true);
    }

    /// Allow `n` more requests, then fail.
    pub fn fail_after(&self, n: usize) {
        self.failing.set(false);
        self.budget.set(Some(n));
    }

    /// Stop failing.
    pub fn recover(&self) {
        self.failing.set(false);
        self.budget.set(None);
    }

    fn admit(&self) -> Result<(), AllocError> {
        if let Some(left) = self.budget.get() {
            if left == 0 {
                self.failing.set(true);
                self.budget.set(None);
            } else {
                self.budget.set(Some(left - 1));
            }
        }
        if self.failing.get() {
            Err(AllocError)
        } else {
            Ok(())
        }
    }
}

// SAFETY: successful requests are served by `Heap`; failures return
// before touching the block.
unsafe impl Allocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        Heap.allocate(layout)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        // SAFETY: forwarded contract; the block came from `Heap`.
        unsafe { Heap.grow(ptr, old, new_size) }
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        self.admit()?;
        // SAFETY: forwarded contract; the block came from `Heap`.
        unsafe { Heap.shrink(ptr, old, new_size) }
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract; the block came from `Heap`.
        unsafe { Heap.free(ptr, layout) }
    }
}

/// Forwards to [`Heap`] and records what happened.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    live_bytes: Cell<usize>,
    allocations: Cell<usize>,
    grows: Cell<usize>,
    shrinks: Cell<usize>,
    frees: Cell<usize>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently handed out.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn grows(&self) -> usize {
        self.grows.get()
    }

    pub fn shrinks(&self) -> usize {
        self.shrinks.get()
    }

    pub fn frees(&self) -> usize {
        self.frees.get()
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }

    fn resized(&self, old: usize, new: usize) {
        self.live_bytes.set(self.live_bytes.get() - old + new);
    }
}

// SAFETY: every request is served by `Heap`.
unsafe impl Allocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = Heap.allocate(layout)?;
        Self::bump(&self.allocations);
        self.resized(0, layout.size());
        Ok(ptr)
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded contract; the block came from `Heap`.
        let ptr = unsafe { Heap.grow(ptr, old, new_size) }?;
        Self::bump(&self.grows);
        self.resized(old.size(), new_size);
        Ok(ptr)
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: forwarded contract; the block came from `Heap`.
        let ptr = unsafe { Heap.shrink(ptr, old, new_size) }?;
        Self::bump(&self.shrinks);
        self.resized(old.size(), new_size);
        Ok(ptr)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract; the block came from `Heap`.
        unsafe { Heap.free(ptr, layout) };
        Self::bump(&self.frees);
        self.resized(layout.size(), 0);
    }
}
