//! Growable contiguous vectors with explicit capacity management.
//!
//! Two containers share one storage engine:
//!
//! ```text
//! ByteVec<A>            (type-erased: element size chosen at runtime)
//! ├── RawBuffer<A>      (block of capacity * size bytes, or none)
//! │   └── A: Allocator  (allocate / grow / shrink / free)
//! └── len
//! TypedVec<T: Copy, A>  (compile-time element type over a ByteVec)
//! ```
//!
//! # Capacity rules
//!
//! - `push` grows 0 → 1 → 2 → 4 → ..., guarding both the doubling and the
//!   byte-size multiplication against overflow.
//! - `reserve` grows to exactly the requested capacity.
//! - `shrink` fits the buffer to the length, and frees it entirely when
//!   the vector is empty. `clear` and `pop` never touch the buffer.
//! - A failed operation leaves the vector unchanged. Only `shrink` absorbs
//!   its failure instead of reporting it.
//!
//! # Safety
//!
//! `unsafe` lives in `raw.rs` and `typed.rs` only. Buffers are
//! zero-filled as they grow, so byte views are ordinary safe slices.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bytes;
pub mod iter;
mod raw;
pub mod typed;

pub use bytes::ByteVec;
pub use iter::Iter;
pub use typed::TypedVec;
pub use vecbuf_core::{Allocator, ElementLayout, Heap, VecError};
