//! Registry of vectors owned on behalf of C callers.
//!
//! Handles are issued from a counter starting at 1 and never reused, so a
//! destroyed handle can never name a later vector, and a zero-initialised
//! `u64` on the C side is always invalid.

use std::collections::BTreeMap;

pub(crate) struct Registry<T> {
    next: u64,
    live: BTreeMap<u64, T>,
}

impl<T> Registry<T> {
    pub(crate) const fn new() -> Self {
        Self {
            next: 1,
            live: BTreeMap::new(),
        }
    }

    /// Take ownership of `value` and issue a fresh handle for it.
    ///
    /// `None` once the handle space is exhausted.
    pub(crate) fn insert(&mut self, value: T) -> Option<u64> {
        let handle = self.next;
        self.next = handle.checked_add(1)?;
        self.live.insert(handle, value);
        Some(handle)
    }

    pub(crate) fn get(&self, handle: u64) -> Option<&T> {
        self.live.get(&handle)
    }

    pub(crate) fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        self.live.get_mut(&handle)
    }

    /// Give up ownership; `handle` is dead from here on.
    pub(crate) fn remove(&mut self, handle: u64) -> Option<T> {
        self.live.remove(&handle)
    }
}
