//! vecbuf: growable contiguous vectors with runtime element sizes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the vecbuf sub-crates. The C ABI lives separately in `vecbuf-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use vecbuf::prelude::*;
//!
//! // Four-byte elements, chosen at runtime.
//! let mut v = ByteVec::new(4).unwrap();
//! for x in 1i32..=5 {
//!     v.push(&x.to_ne_bytes()).unwrap();
//! }
//! assert_eq!(v.capacity(), 8);
//!
//! assert!(v.remove(2));
//! let values: Vec<i32> = v
//!     .iter()
//!     .map(|e| i32::from_ne_bytes(e.try_into().unwrap()))
//!     .collect();
//! assert_eq!(values, [1, 2, 4, 5]);
//!
//! v.pop();
//! v.shrink();
//! assert_eq!(v.capacity(), 3);
//!
//! // The same engine with a compile-time element type.
//! let mut t: TypedVec<i32> = TypedVec::new();
//! t.push(7).unwrap();
//! assert_eq!(t.back(), Some(&7));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `vecbuf-core` | `ElementLayout`, `Allocator`, `Heap`, errors |
//! | [`store`] | `vecbuf-store` | `ByteVec`, `TypedVec`, element iterator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element layouts, the allocator seam and error types (`vecbuf-core`).
///
/// Implement [`types::Allocator`] to back vectors with your own memory.
pub use vecbuf_core as types;

/// Vector containers (`vecbuf-store`).
///
/// [`store::ByteVec`] for element sizes known at runtime,
/// [`store::TypedVec`] for `Copy` element types.
pub use vecbuf_store as store;

/// Common imports for typical vecbuf usage.
///
/// ```rust
/// use vecbuf::prelude::*;
/// ```
pub mod prelude {
    pub use vecbuf_core::{AllocError, Allocator, ElementLayout, Heap, VecError};
    pub use vecbuf_store::{ByteVec, TypedVec};
}
